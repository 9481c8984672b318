//! Core finance logic: records, stores, monthly aggregation and the
//! `Finance` service that ties them together.

pub mod aggregator;
pub mod error;
pub mod finance;
pub mod import;
pub mod memory;
pub mod models;
pub mod reports;
pub mod store;
pub mod time;
pub mod types;

pub use aggregator::{summarize_month, MonthFailure, MonthTotals, MonthlyAggregator, RecomputeReport, UserLocks};
pub use error::{
    CoreError, CoreResult, DefaultErrorLogger, ErrorCode, ErrorContext, ErrorDetails, ErrorLogger,
    ErrorSeverity,
};
pub use finance::Finance;
pub use import::{import_statement, PreparedImport};
pub use memory::{MemoryStore, StoreData};
pub use models::{
    Account, AccountPatch, Budget, BudgetPatch, CategorySpend, Goal, GoalPatch, MonthlyAggregate,
    MonthlyAggregateInput, NewAccount, NewBudget, NewGoal, NewTransaction, Owned, Transaction,
    TransactionPatch,
};
pub use reports::{CategoryTotal, FinancialStats, PageRef, Pagination, TransactionPage, TransactionQuery};
pub use store::{AccountStore, AggregateStore, BudgetStore, GoalStore, Stores, TransactionStore};
pub use time::{DateRange, MonthKey};
pub use types::{AccountType, BudgetPeriod, GoalCategory, GoalStatus, RecurringFrequency};

pub use budgetweb_parser::Category;
