//! Monthly aggregation
//!
//! Rolls a user's transactions up into one `MonthlyAggregate` per calendar
//! month. Each month is computed from scratch and written with a single
//! create or update, so repeated runs converge on the same output.
//!
//! Two entry points share the per-month work:
//! - [`MonthlyAggregator::recompute`] rescans every month of a user (backfill)
//! - [`MonthlyAggregator::recompute_months`] refreshes only the given months,
//!   which is what transaction writes trigger
//!
//! Both hold a per-user async lock for their whole run, so two recomputes for
//! the same user never race on the find-then-create of an aggregate.

use budgetweb_config::FailurePolicy;
use budgetweb_parser::Category;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};
use tokio::sync::OwnedMutexGuard;

use crate::error::{CoreError, CoreResult};
use crate::models::{add_amount, savings_rate, Budget, CategorySpend, MonthlyAggregate, Transaction};
use crate::store::{AggregateStore, BudgetStore, TransactionStore};
use crate::time::MonthKey;

/// Async mutexes keyed by user id
///
/// An entry nobody holds or waits on is only referenced by the map; such
/// entries are dropped on the next `lock`, so the map stays bounded by the
/// users with a recompute in flight.
#[derive(Default)]
pub struct UserLocks {
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for and take the lock of `user_id`
    pub async fn lock(&self, user_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(user_id.to_string()).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// Number of users currently tracked
    pub fn tracked(&self) -> usize {
        self.locks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

/// Figures computed for one month
#[derive(Debug, Clone, PartialEq)]
pub struct MonthTotals {
    pub income: Decimal,
    pub expenses: Decimal,
    pub savings: Decimal,
    pub savings_rate: Decimal,
    pub category_spending: Vec<CategorySpend>,
}

impl MonthTotals {
    fn apply_to(self, aggregate: &mut MonthlyAggregate) {
        aggregate.income = self.income;
        aggregate.expenses = self.expenses;
        aggregate.savings = self.savings;
        aggregate.savings_rate = self.savings_rate;
        aggregate.category_spending = self.category_spending;
        aggregate.is_auto_generated = true;
    }
}

/// Compute a month's totals from its transactions and the budgets overlapping it
///
/// Zero amounts count as neither income nor expense. The budget for a
/// category comes from the first matching budget in `budgets`. Totals that
/// overflow are a validation error.
pub fn summarize_month(transactions: &[Transaction], budgets: &[Budget]) -> CoreResult<MonthTotals> {
    let mut income = Decimal::ZERO;
    let mut expenses = Decimal::ZERO;
    let mut by_category: HashMap<Category, Decimal> = HashMap::new();

    for tx in transactions {
        if tx.is_income() {
            income = add_amount(income, tx.amount, "Monthly income")?;
        } else if tx.is_expense() {
            let spent = tx.amount.abs();
            expenses = add_amount(expenses, spent, "Monthly expenses")?;
            let category_total = by_category.entry(tx.category).or_default();
            *category_total = add_amount(*category_total, spent, "Category spending")?;
        }
    }

    let mut category_spending: Vec<CategorySpend> = by_category
        .into_iter()
        .map(|(category, amount)| CategorySpend {
            category,
            amount,
            budget: budgets
                .iter()
                .find(|b| b.category == category)
                .map(|b| b.amount)
                .unwrap_or_default(),
        })
        .collect();
    category_spending.sort_by(|a, b| {
        b.amount
            .cmp(&a.amount)
            .then_with(|| a.category.cmp(&b.category))
    });

    let savings = income
        .checked_sub(expenses)
        .ok_or_else(|| CoreError::validation("Monthly savings out of range"))?;
    Ok(MonthTotals {
        income,
        expenses,
        savings,
        savings_rate: savings_rate(income, savings),
        category_spending,
    })
}

/// A month the aggregator could not write
#[derive(Debug, Clone, Serialize)]
pub struct MonthFailure {
    pub month: MonthKey,
    pub error: String,
}

/// What a recompute touched
#[derive(Debug, Clone, Default, Serialize)]
pub struct RecomputeReport {
    /// Months whose aggregate was created or refreshed, in calendar order
    pub updated: Vec<MonthKey>,
    pub failed: Vec<MonthFailure>,
}

pub struct MonthlyAggregator {
    transactions: Arc<dyn TransactionStore>,
    budgets: Arc<dyn BudgetStore>,
    aggregates: Arc<dyn AggregateStore>,
    policy: FailurePolicy,
    locks: UserLocks,
}

impl MonthlyAggregator {
    pub fn new(
        transactions: Arc<dyn TransactionStore>,
        budgets: Arc<dyn BudgetStore>,
        aggregates: Arc<dyn AggregateStore>,
        policy: FailurePolicy,
    ) -> Self {
        Self {
            transactions,
            budgets,
            aggregates,
            policy,
            locks: UserLocks::new(),
        }
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Locks recomputes hold; other writers of aggregates take them too
    pub fn locks(&self) -> &UserLocks {
        &self.locks
    }

    /// Recompute every month of a user
    ///
    /// Covers each month with at least one transaction plus every existing
    /// auto-generated aggregate, so months whose transactions are gone drop
    /// back to zero instead of keeping stale totals.
    pub async fn recompute(&self, user_id: &str) -> CoreResult<RecomputeReport> {
        let _guard = self.locks.lock(user_id).await;

        let mut months: BTreeSet<MonthKey> = self
            .transactions
            .find(user_id, None)
            .await?
            .iter()
            .map(Transaction::month)
            .collect();
        months.extend(
            self.aggregates
                .find(user_id, None)
                .await?
                .iter()
                .filter(|a| a.is_auto_generated)
                .map(MonthlyAggregate::key),
        );

        log::debug!("Recomputing {} months for user {}", months.len(), user_id);
        self.run(user_id, months).await
    }

    /// Recompute the given months of a user
    pub async fn recompute_months(
        &self,
        user_id: &str,
        months: impl IntoIterator<Item = MonthKey>,
    ) -> CoreResult<RecomputeReport> {
        let _guard = self.locks.lock(user_id).await;
        let months: BTreeSet<MonthKey> = months.into_iter().collect();
        self.run(user_id, months).await
    }

    /// Recompute a single month of a user
    pub async fn recompute_month(&self, user_id: &str, month: MonthKey) -> CoreResult<RecomputeReport> {
        self.recompute_months(user_id, [month]).await
    }

    async fn run(&self, user_id: &str, months: BTreeSet<MonthKey>) -> CoreResult<RecomputeReport> {
        let mut report = RecomputeReport::default();

        for month in months {
            match self.refresh_month(user_id, month).await {
                Ok(true) => report.updated.push(month),
                Ok(false) => {}
                Err(e) => match self.policy {
                    FailurePolicy::FailFast => {
                        log::error!("Aggregation of {} for user {} failed: {}", month, user_id, e);
                        return Err(e);
                    }
                    FailurePolicy::BestEffort => {
                        log::warn!(
                            "Aggregation of {} for user {} failed, continuing: {}",
                            month,
                            user_id,
                            e
                        );
                        report.failed.push(MonthFailure {
                            month,
                            error: e.to_string(),
                        });
                    }
                },
            }
        }

        if !report.failed.is_empty() {
            return Err(CoreError::AggregationFailed {
                months: report.failed.iter().map(|f| f.month.label()).collect(),
            });
        }

        log::info!(
            "Recomputed {} monthly aggregates for user {}",
            report.updated.len(),
            user_id
        );
        Ok(report)
    }

    /// Rewrite one month's aggregate; false when there was nothing to write
    ///
    /// A month without transactions is only touched when it already has an
    /// auto-generated aggregate. Manual aggregates of empty months are left
    /// alone.
    async fn refresh_month(&self, user_id: &str, month: MonthKey) -> CoreResult<bool> {
        let window = month
            .window()
            .ok_or_else(|| CoreError::validation(format!("Invalid month: {:?}", month)))?;

        let transactions = self.transactions.find(user_id, Some(window)).await?;
        let existing = self.aggregates.find_one(user_id, month).await?;

        if transactions.is_empty() && !existing.as_ref().map_or(false, |a| a.is_auto_generated) {
            return Ok(false);
        }

        let budgets = self.budgets.find_overlapping(user_id, window).await?;
        let totals = summarize_month(&transactions, &budgets)?;

        match existing {
            Some(mut aggregate) => {
                totals.apply_to(&mut aggregate);
                self.aggregates.update(aggregate).await?;
            }
            None => {
                let mut aggregate = MonthlyAggregate::empty(user_id, month);
                totals.apply_to(&mut aggregate);
                self.aggregates.create(aggregate).await?;
            }
        }
        Ok(true)
    }
}
