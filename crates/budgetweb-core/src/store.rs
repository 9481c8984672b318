//! Storage seams
//!
//! Services only talk to these traits. Ownership checks live in the service
//! layer; stores filter by `user_id` where a query is per user and otherwise
//! look records up by id alone.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::CoreResult;
use crate::models::{Account, Budget, Goal, MonthlyAggregate, Transaction};
use crate::time::{DateRange, MonthKey};

#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// A user's transactions, optionally restricted to an inclusive date range,
    /// in insertion order
    async fn find(&self, user_id: &str, range: Option<DateRange>) -> CoreResult<Vec<Transaction>>;
    async fn get(&self, id: &str) -> CoreResult<Option<Transaction>>;
    async fn create(&self, transaction: Transaction) -> CoreResult<Transaction>;
    async fn update(&self, transaction: Transaction) -> CoreResult<Transaction>;
    async fn delete(&self, id: &str) -> CoreResult<()>;
}

#[async_trait]
pub trait BudgetStore: Send + Sync {
    async fn find(&self, user_id: &str) -> CoreResult<Vec<Budget>>;
    /// Budgets whose window shares a day with `range`, in insertion order
    async fn find_overlapping(&self, user_id: &str, range: DateRange) -> CoreResult<Vec<Budget>>;
    async fn get(&self, id: &str) -> CoreResult<Option<Budget>>;
    /// Fails with `DuplicateEntry` when the (user, category, period) slot is taken
    async fn create(&self, budget: Budget) -> CoreResult<Budget>;
    async fn update(&self, budget: Budget) -> CoreResult<Budget>;
    async fn delete(&self, id: &str) -> CoreResult<()>;
}

#[async_trait]
pub trait GoalStore: Send + Sync {
    async fn find(&self, user_id: &str) -> CoreResult<Vec<Goal>>;
    async fn get(&self, id: &str) -> CoreResult<Option<Goal>>;
    async fn create(&self, goal: Goal) -> CoreResult<Goal>;
    async fn update(&self, goal: Goal) -> CoreResult<Goal>;
    async fn delete(&self, id: &str) -> CoreResult<()>;
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find(&self, user_id: &str) -> CoreResult<Vec<Account>>;
    async fn get(&self, id: &str) -> CoreResult<Option<Account>>;
    async fn create(&self, account: Account) -> CoreResult<Account>;
    async fn update(&self, account: Account) -> CoreResult<Account>;
    async fn delete(&self, id: &str) -> CoreResult<()>;
}

#[async_trait]
pub trait AggregateStore: Send + Sync {
    async fn find_one(&self, user_id: &str, month: MonthKey) -> CoreResult<Option<MonthlyAggregate>>;
    /// A user's aggregates sorted by (year, month_num), optionally for one year
    async fn find(&self, user_id: &str, year: Option<i32>) -> CoreResult<Vec<MonthlyAggregate>>;
    /// Fails with `DuplicateEntry` when the (user, year, month_num) key is taken
    async fn create(&self, aggregate: MonthlyAggregate) -> CoreResult<MonthlyAggregate>;
    async fn update(&self, aggregate: MonthlyAggregate) -> CoreResult<MonthlyAggregate>;
    /// Most recent month
    async fn latest(&self, user_id: &str) -> CoreResult<Option<MonthlyAggregate>>;
}

/// The full set of stores a `Finance` service needs
#[derive(Clone)]
pub struct Stores {
    pub transactions: Arc<dyn TransactionStore>,
    pub budgets: Arc<dyn BudgetStore>,
    pub goals: Arc<dyn GoalStore>,
    pub accounts: Arc<dyn AccountStore>,
    pub aggregates: Arc<dyn AggregateStore>,
}
