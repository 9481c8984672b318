//! Types produced by the statement parser

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::SkipReason;

/// Annotation attached to every transaction created by a statement import
pub const IMPORT_NOTE: &str = "Imported from bank statement";

/// Transaction category label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Housing,
    Transportation,
    Food,
    Utilities,
    Healthcare,
    Insurance,
    Debt,
    Entertainment,
    Clothing,
    Education,
    Savings,
    Investments,
    Income,
    Other,
}

impl Category {
    pub const ALL: [Category; 14] = [
        Category::Housing,
        Category::Transportation,
        Category::Food,
        Category::Utilities,
        Category::Healthcare,
        Category::Insurance,
        Category::Debt,
        Category::Entertainment,
        Category::Clothing,
        Category::Education,
        Category::Savings,
        Category::Investments,
        Category::Income,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Housing => "Housing",
            Category::Transportation => "Transportation",
            Category::Food => "Food",
            Category::Utilities => "Utilities",
            Category::Healthcare => "Healthcare",
            Category::Insurance => "Insurance",
            Category::Debt => "Debt",
            Category::Entertainment => "Entertainment",
            Category::Clothing => "Clothing",
            Category::Education => "Education",
            Category::Savings => "Savings",
            Category::Investments => "Investments",
            Category::Income => "Income",
            Category::Other => "Other",
        }
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::Other
    }
}

impl std::str::FromStr for Category {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Category::ALL
            .iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .copied()
            .ok_or_else(|| format!("Invalid category: {}", s))
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transaction recovered from one statement line
///
/// Positive amounts are income/credits, negative amounts are expenses/debits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedTransaction {
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    pub category: Category,
    pub notes: String,
}

/// Running totals over an import
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub starting_balance: Decimal,
    pub ending_balance: Decimal,
}

impl ImportSummary {
    pub fn new(starting_balance: Decimal) -> Self {
        Self {
            starting_balance,
            ending_balance: starting_balance,
            ..Default::default()
        }
    }

    /// Add one amount to the income or expense total and the running balance
    ///
    /// Nothing changes when any of the three would overflow.
    pub fn record(&mut self, amount: Decimal) -> Result<(), SkipReason> {
        let out_of_range = || SkipReason::AmountOutOfRange {
            value: amount.to_string(),
        };

        let balance = self.ending_balance.checked_add(amount).ok_or_else(out_of_range)?;
        if amount > Decimal::ZERO {
            self.total_income = self.total_income.checked_add(amount).ok_or_else(out_of_range)?;
        } else {
            self.total_expenses = self
                .total_expenses
                .checked_add(amount.abs())
                .ok_or_else(out_of_range)?;
        }
        self.ending_balance = balance;
        Ok(())
    }
}

/// A line that produced no transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedLine {
    /// 1-based line number in the raw input
    pub line_number: usize,
    pub content: String,
    pub reason: SkipReason,
}

/// Result of parsing one line
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    Parsed(ParsedTransaction),
    Skipped(SkippedLine),
}

/// Everything a parse run produced
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParseReport {
    /// Transactions in input line order
    pub transactions: Vec<ParsedTransaction>,
    pub skipped: Vec<SkippedLine>,
    pub summary: ImportSummary,
}

impl ParseReport {
    pub fn new(starting_balance: Decimal) -> Self {
        Self {
            transactions: Vec::new(),
            skipped: Vec::new(),
            summary: ImportSummary::new(starting_balance),
        }
    }

    /// Fold one line outcome into the report
    ///
    /// A parsed line whose amount cannot be added to the totals is kept as
    /// skipped instead.
    pub fn push(&mut self, outcome: LineOutcome, line_number: usize, content: &str) {
        match outcome {
            LineOutcome::Parsed(tx) => match self.summary.record(tx.amount) {
                Ok(()) => self.transactions.push(tx),
                Err(reason) => {
                    log::debug!("Skipping statement line {}: {} ({})", line_number, content, reason);
                    self.skipped.push(SkippedLine {
                        line_number,
                        content: content.to_string(),
                        reason,
                    });
                }
            },
            LineOutcome::Skipped(skipped) => self.skipped.push(skipped),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_category_from_str_ignores_case() {
        assert_eq!("food".parse::<Category>().unwrap(), Category::Food);
        assert_eq!(" HEALTHCARE ".parse::<Category>().unwrap(), Category::Healthcare);
        assert!("Groceries".parse::<Category>().is_err());
    }

    #[test]
    fn test_category_serializes_as_label() {
        let json = serde_json::to_string(&Category::Investments).unwrap();
        assert_eq!(json, "\"Investments\"");
    }

    #[test]
    fn test_summary_arithmetic() {
        let mut summary = ImportSummary::new(Decimal::ZERO);
        for amount in [dec!(100), dec!(-30), dec!(-20)] {
            summary.record(amount).unwrap();
        }

        assert_eq!(summary.total_income, dec!(100));
        assert_eq!(summary.total_expenses, dec!(50));
        assert_eq!(summary.ending_balance, dec!(50));
    }

    #[test]
    fn test_summary_with_starting_balance() {
        let mut summary = ImportSummary::new(dec!(1000));
        summary.record(dec!(-250.75)).unwrap();
        summary.record(dec!(0)).unwrap();

        assert_eq!(summary.total_income, dec!(0));
        assert_eq!(summary.total_expenses, dec!(250.75));
        assert_eq!(summary.ending_balance, dec!(749.25));
    }

    #[test]
    fn test_overflowing_amount_leaves_summary_untouched() {
        let mut summary = ImportSummary::new(Decimal::ZERO);
        summary.record(Decimal::MAX).unwrap();

        let err = summary.record(dec!(1)).unwrap_err();
        assert!(matches!(err, SkipReason::AmountOutOfRange { .. }));
        assert_eq!(summary.total_income, Decimal::MAX);
        assert_eq!(summary.ending_balance, Decimal::MAX);

        summary.record(dec!(-1)).unwrap();
        assert_eq!(summary.total_expenses, dec!(1));
    }

    #[test]
    fn test_overflowing_line_is_reported_as_skipped() {
        let mut report = ParseReport::new(Decimal::MAX);
        let tx = ParsedTransaction {
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            description: "Deposit".to_string(),
            amount: dec!(5),
            category: Category::Income,
            notes: IMPORT_NOTE.to_string(),
        };
        report.push(LineOutcome::Parsed(tx), 3, "02/01/2024,Deposit,5");

        assert!(report.transactions.is_empty());
        assert_eq!(report.skipped[0].line_number, 3);
        assert_eq!(report.skipped[0].content, "02/01/2024,Deposit,5");
        assert_eq!(report.summary.ending_balance, Decimal::MAX);
    }
}
