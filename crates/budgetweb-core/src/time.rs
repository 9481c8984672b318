//! Calendar months and inclusive date ranges

use budgetweb_utils::{month_label, parse_month_label};
use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Inclusive date range `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Check if a date falls inside the range
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Check if two ranges share at least one day
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start <= other.end && self.end >= other.start
    }

    /// The calendar month containing today
    pub fn current_month() -> Self {
        let today = Utc::now().date_naive();
        let key = MonthKey::of(today);
        key.window().unwrap_or(Self::new(today, today))
    }
}

/// A calendar month identified by year and zero-based month number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MonthKey {
    pub year: i32,
    /// 0 = January
    pub month_num: u32,
}

impl MonthKey {
    /// Build a key, rejecting month numbers outside 0..12 and years chrono cannot represent
    pub fn new(year: i32, month_num: u32) -> Option<Self> {
        let key = Self { year, month_num };
        key.window().map(|_| key)
    }

    /// Month containing `date`
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month_num: date.month0(),
        }
    }

    /// Parse a `"Jan 2024"` style label
    pub fn from_label(label: &str) -> Option<Self> {
        let (year, month_num) = parse_month_label(label)?;
        Self::new(year, month_num)
    }

    /// `"Jan 2024"` style label
    pub fn label(&self) -> String {
        month_label(self.year, self.month_num)
    }

    /// First and last day of the month
    pub fn window(&self) -> Option<DateRange> {
        if self.month_num > 11 {
            return None;
        }
        let first = NaiveDate::from_ymd_opt(self.year, self.month_num + 1, 1)?;
        let last = if self.month_num == 11 {
            NaiveDate::from_ymd_opt(self.year, 12, 31)?
        } else {
            NaiveDate::from_ymd_opt(self.year, self.month_num + 2, 1)?.pred_opt()?
        };
        Some(DateRange::new(first, last))
    }
}

impl std::fmt::Display for MonthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_window() {
        let window = MonthKey::new(2024, 1).unwrap().window().unwrap();
        assert_eq!(window.start, date(2024, 2, 1));
        assert_eq!(window.end, date(2024, 2, 29));

        let december = MonthKey::new(2023, 11).unwrap().window().unwrap();
        assert_eq!(december.end, date(2023, 12, 31));
    }

    #[test]
    fn test_invalid_month_num() {
        assert!(MonthKey::new(2024, 12).is_none());
        assert!(MonthKey { year: 2024, month_num: 12 }.window().is_none());
    }

    #[test]
    fn test_month_of_date_and_label() {
        let key = MonthKey::of(date(2024, 1, 15));
        assert_eq!(key, MonthKey { year: 2024, month_num: 0 });
        assert_eq!(key.label(), "Jan 2024");
        assert_eq!(MonthKey::from_label("Jan 2024"), Some(key));
        assert_eq!(MonthKey::from_label("Smarch 2024"), None);
    }

    #[test]
    fn test_month_ordering() {
        let mut keys = vec![
            MonthKey { year: 2024, month_num: 0 },
            MonthKey { year: 2023, month_num: 11 },
            MonthKey { year: 2024, month_num: 2 },
        ];
        keys.sort();
        assert_eq!(keys[0], MonthKey { year: 2023, month_num: 11 });
        assert_eq!(keys[2], MonthKey { year: 2024, month_num: 2 });
    }

    #[test]
    fn test_range_overlap() {
        let january = MonthKey::new(2024, 0).unwrap().window().unwrap();
        let spanning = DateRange::new(date(2023, 12, 15), date(2024, 1, 1));
        let after = DateRange::new(date(2024, 2, 1), date(2024, 2, 28));

        assert!(january.overlaps(&spanning));
        assert!(spanning.overlaps(&january));
        assert!(!january.overlaps(&after));
        assert!(january.contains(date(2024, 1, 31)));
        assert!(!january.contains(date(2024, 2, 1)));
    }

    #[test]
    fn test_current_month_contains_today() {
        let range = DateRange::current_month();
        assert!(range.contains(Utc::now().date_naive()));
        assert_eq!(range.start.day(), 1);
    }
}
