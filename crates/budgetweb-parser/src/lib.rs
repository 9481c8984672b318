//! Bank statement parser and categorizer
//!
//! Turns pasted statement text into normalized transactions plus an
//! income/expense summary. Lines that cannot be read are skipped and
//! reported, never fatal.

use rust_decimal::Decimal;
use std::sync::Arc;

pub mod classifier;
pub mod error;
pub mod parser;
pub mod types;

pub use classifier::{classify, keyword_rules};
pub use error::SkipReason;
pub use parser::StatementParser;
pub use types::{
    Category, ImportSummary, LineOutcome, ParseReport, ParsedTransaction, SkippedLine, IMPORT_NOTE,
};

// ==================== Parser Trait ====================

/// Parser reference type
pub type ParserRef = Arc<dyn StatementParserTrait>;

/// Trait for statement parsers
pub trait StatementParserTrait: Send + Sync {
    /// Parse raw statement text, starting the running balance at `starting_balance`
    fn parse(&self, content: &str, starting_balance: Decimal) -> ParseReport;
}

/// Default parser implementation
#[derive(Debug, Default)]
pub struct DefaultStatementParser;

impl StatementParserTrait for DefaultStatementParser {
    fn parse(&self, content: &str, starting_balance: Decimal) -> ParseReport {
        StatementParser::parse_with_balance(content, starting_balance)
    }
}
