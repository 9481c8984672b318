//! Statement import preparation

use budgetweb_parser::{ImportSummary, ParsedTransaction, SkippedLine, StatementParserTrait};
use budgetweb_utils::generate_id;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{Transaction, MAX_DESCRIPTION_LEN};
use crate::types::RecurringFrequency;

/// Parsed statement, turned into user-owned transactions but not yet stored
#[derive(Debug, Clone, Serialize)]
pub struct PreparedImport {
    pub transactions: Vec<Transaction>,
    pub summary: ImportSummary,
    pub skipped: Vec<SkippedLine>,
}

/// Parse `raw` and attach every resulting transaction to `user_id`
pub fn import_statement(
    parser: &dyn StatementParserTrait,
    raw: &str,
    user_id: &str,
    starting_balance: Decimal,
) -> PreparedImport {
    let report = parser.parse(raw, starting_balance);
    let transactions = report
        .transactions
        .into_iter()
        .map(|parsed| to_transaction(parsed, user_id))
        .collect();

    PreparedImport {
        transactions,
        summary: report.summary,
        skipped: report.skipped,
    }
}

fn to_transaction(parsed: ParsedTransaction, user_id: &str) -> Transaction {
    // bank descriptions can run long; keep the stored one within bounds
    let description = if parsed.description.chars().count() > MAX_DESCRIPTION_LEN {
        parsed.description.chars().take(MAX_DESCRIPTION_LEN).collect()
    } else {
        parsed.description
    };

    Transaction {
        id: generate_id(),
        user_id: user_id.to_string(),
        date: parsed.date,
        description,
        amount: parsed.amount,
        category: parsed.category,
        is_recurring: false,
        recurring_frequency: RecurringFrequency::None,
        notes: Some(parsed.notes),
        created_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use budgetweb_parser::{Category, DefaultStatementParser, IMPORT_NOTE};
    use rust_decimal_macros::dec;

    #[test]
    fn test_import_attaches_owner_and_note() {
        let raw = "Date,Description,Amount\n15/01/2024,Payroll ACME,2500.00\n16/01/2024,Whole Foods grocery,-84.20";
        let prepared = import_statement(&DefaultStatementParser, raw, "u1", dec!(100));

        assert_eq!(prepared.transactions.len(), 2);
        assert!(prepared.transactions.iter().all(|t| t.user_id == "u1"));
        assert_eq!(prepared.transactions[0].category, Category::Income);
        assert_eq!(prepared.transactions[1].category, Category::Food);
        assert_eq!(prepared.transactions[1].notes.as_deref(), Some(IMPORT_NOTE));
        assert_eq!(prepared.summary.ending_balance, dec!(2515.80));
        assert!(prepared.skipped.is_empty());
    }

    #[test]
    fn test_import_reports_skipped_lines() {
        let raw = "15/01/2024,Coffee\n16/01/2024,Tea,-3.00";
        let prepared = import_statement(&DefaultStatementParser, raw, "u1", dec!(0));

        assert_eq!(prepared.transactions.len(), 1);
        assert_eq!(prepared.skipped.len(), 1);
        assert_eq!(prepared.skipped[0].line_number, 1);
    }

    #[test]
    fn test_long_descriptions_are_truncated() {
        let raw = format!("15/01/2024,{},-1.00", "x".repeat(150));
        let prepared = import_statement(&DefaultStatementParser, &raw, "u1", dec!(0));

        let tx = &prepared.transactions[0];
        assert_eq!(tx.description.chars().count(), MAX_DESCRIPTION_LEN);
        assert!(tx.validate().is_ok());
    }
}
