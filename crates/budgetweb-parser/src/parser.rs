//! Line based parser for pasted bank statements
//!
//! Input is one record per line, comma separated, with optional double
//! quoted fields and an optional header row:
//!
//! ```text
//! Date,Description,Amount,Category
//! 05/01/2024,"Coffee, Tea",-4.50,Food
//! 06/01/2024,ACME Payroll,"2,500.00"
//! ```

use chrono::NaiveDate;
use once_cell::sync::OnceCell;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::classifier::classify;
use crate::error::SkipReason;
use crate::types::{Category, LineOutcome, ParseReport, ParsedTransaction, SkippedLine, IMPORT_NOTE};

const HEADER_MARKERS: [&str; 3] = ["date", "description", "amount"];

/// Simple line-based statement parser
pub struct StatementParser;

impl StatementParser {
    /// Parse statement text with a zero starting balance
    pub fn parse(content: &str) -> ParseReport {
        Self::parse_with_balance(content, Decimal::ZERO)
    }

    /// Parse statement text; bad lines are skipped and reported, never fatal
    pub fn parse_with_balance(content: &str, starting_balance: Decimal) -> ParseReport {
        let mut report = ParseReport::new(starting_balance);
        let lines: Vec<&str> = content.split('\n').collect();

        let start = match lines.first() {
            Some(first) if Self::is_header(first) => 1,
            _ => 0,
        };

        for (idx, line) in lines.iter().enumerate().skip(start) {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let outcome = Self::parse_line(trimmed, idx + 1);
            if let LineOutcome::Skipped(ref skipped) = outcome {
                log::debug!(
                    "Skipping statement line {}: {} ({})",
                    skipped.line_number,
                    skipped.content,
                    skipped.reason
                );
            }
            report.push(outcome, idx + 1, trimmed);
        }

        log::info!(
            "Parsed statement: {} transactions, {} skipped lines",
            report.transactions.len(),
            report.skipped.len()
        );

        report
    }

    /// A first line naming any of the expected columns is a header
    pub fn is_header(line: &str) -> bool {
        let lower = line.to_lowercase();
        HEADER_MARKERS.iter().any(|marker| lower.contains(marker))
    }

    /// Parse one non-blank line; `line_number` is 1-based
    pub fn parse_line(line: &str, line_number: usize) -> LineOutcome {
        let skip = |reason: SkipReason| {
            LineOutcome::Skipped(SkippedLine {
                line_number,
                content: line.to_string(),
                reason,
            })
        };

        let fields = Self::split_fields(line);
        if fields.len() < 3 {
            return skip(SkipReason::TooFewFields { found: fields.len() });
        }

        let date = match Self::normalize_date(&fields[0]).and_then(|d| Self::parse_date(&d)) {
            Ok(date) => date,
            Err(reason) => return skip(reason),
        };

        let description = fields[1].replace('"', "").trim().to_string();
        if description.is_empty() {
            return skip(SkipReason::MissingDescription);
        }

        let amount = match Self::parse_amount(&fields[2]) {
            Ok(amount) => amount,
            Err(reason) => return skip(reason),
        };

        let category = Self::resolve_category(fields.get(3).map(String::as_str), &description);

        LineOutcome::Parsed(ParsedTransaction {
            date,
            description,
            amount,
            category,
            notes: IMPORT_NOTE.to_string(),
        })
    }

    /// Split a line on commas that are outside double quotes
    ///
    /// Quote characters toggle the quoted state and are dropped. An unmatched
    /// quote leaves the rest of the line quoted.
    pub fn split_fields(line: &str) -> Vec<String> {
        let mut fields = Vec::new();
        let mut current = String::new();
        let mut in_quotes = false;

        for c in line.chars() {
            match c {
                '"' => in_quotes = !in_quotes,
                ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
                _ => current.push(c),
            }
        }

        fields.push(current);
        fields
    }

    /// Rewrite day-first dates to month-first
    ///
    /// `05/01/2024` becomes `01/05/2024`. Anything whose first two parts are
    /// not both at most two characters long is returned unchanged.
    pub fn normalize_date(raw: &str) -> Result<String, SkipReason> {
        let unquoted = raw.replace('"', "");
        let cleaned = unquoted.trim();

        let separator = if cleaned.contains('/') {
            '/'
        } else if cleaned.contains('-') {
            '-'
        } else {
            return Err(SkipReason::UnrecognizedDate {
                value: cleaned.to_string(),
            });
        };

        let parts: Vec<&str> = cleaned.split(separator).collect();
        if parts.len() == 3 && parts[0].chars().count() <= 2 && parts[1].chars().count() <= 2 {
            return Ok(format!("{}/{}/{}", parts[1], parts[0], parts[2]));
        }

        Ok(cleaned.to_string())
    }

    /// Turn a normalized date string into a calendar date
    ///
    /// Accepts `YYYY/MM/DD`, `YYYY-MM-DD` and month-first `MM/DD/YYYY` (or
    /// `MM/DD/YY`, where 00-49 is 20xx and 50-99 is 19xx).
    pub fn parse_date(normalized: &str) -> Result<NaiveDate, SkipReason> {
        let invalid = || SkipReason::InvalidDate {
            value: normalized.to_string(),
        };

        let parts: Vec<&str> = normalized.split(['/', '-']).map(str::trim).collect();
        if parts.len() != 3
            || parts
                .iter()
                .any(|p| p.is_empty() || !p.chars().all(|c| c.is_ascii_digit()))
        {
            return Err(invalid());
        }

        let (year_part, month_part, day_part) = if parts[0].len() == 4 {
            (parts[0], parts[1], parts[2])
        } else {
            (parts[2], parts[0], parts[1])
        };

        let mut year: i32 = year_part.parse().map_err(|_| invalid())?;
        if year_part.len() <= 2 {
            year += if year < 50 { 2000 } else { 1900 };
        }
        let month: u32 = month_part.parse().map_err(|_| invalid())?;
        let day: u32 = day_part.parse().map_err(|_| invalid())?;

        NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
    }

    /// Parse an amount field
    ///
    /// Every character other than digits, `.` and `-` is dropped, then the
    /// longest leading number is read. `$1,234.50` is 1234.50; `(12.00)` is
    /// positive 12.00.
    pub fn parse_amount(raw: &str) -> Result<Decimal, SkipReason> {
        static AMOUNT_NOISE: OnceCell<Regex> = OnceCell::new();
        let noise = AMOUNT_NOISE.get_or_init(|| Regex::new(r"[^0-9.\-]").expect("valid amount pattern"));

        let stripped = noise.replace_all(raw, "");
        let invalid = || SkipReason::InvalidAmount {
            value: raw.trim().to_string(),
        };

        let number = Self::leading_number(&stripped).ok_or_else(invalid)?;
        Decimal::from_str(&number).map_err(|_| invalid())
    }

    /// Longest prefix of the form `-?digits(.digits)?`, with at least one digit
    fn leading_number(s: &str) -> Option<String> {
        let mut chars = s.chars().peekable();
        let mut out = String::new();
        let mut digits = 0usize;
        let mut seen_dot = false;

        if chars.peek() == Some(&'-') {
            out.push('-');
            chars.next();
        }

        for c in chars {
            match c {
                '0'..='9' => {
                    digits += 1;
                    out.push(c);
                }
                '.' if !seen_dot => {
                    seen_dot = true;
                    out.push(c);
                }
                _ => break,
            }
        }

        if digits == 0 {
            return None;
        }
        if out.ends_with('.') {
            out.pop();
        }
        if out.starts_with('.') {
            out.insert(0, '0');
        } else if out.starts_with("-.") {
            out.insert(1, '0');
        }
        Some(out)
    }

    /// Explicit category column if it names a known label, else the classifier
    fn resolve_category(explicit: Option<&str>, description: &str) -> Category {
        let label = explicit
            .map(|f| f.replace('"', "").trim().to_string())
            .filter(|f| !f.is_empty());

        match label {
            Some(label) => label.parse().unwrap_or_else(|_| {
                log::debug!("Unknown category '{}', classifying '{}'", label, description);
                classify(description)
            }),
            None => classify(description),
        }
    }
}
