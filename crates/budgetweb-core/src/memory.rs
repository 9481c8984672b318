//! In-memory store with optional JSON snapshot
//!
//! Records live in insertion-ordered vectors behind one `RwLock`, so the
//! order callers see from `find` is the order records were created. When a
//! snapshot path is set, every mutation is applied to a copy of the data set,
//! the copy is written out, and only then does it replace the live data. A
//! failed write leaves the store as it was.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{CoreError, CoreResult};
use crate::models::{Account, Budget, Goal, MonthlyAggregate, Owned, Transaction};
use crate::store::{AccountStore, AggregateStore, BudgetStore, GoalStore, Stores, TransactionStore};
use crate::time::{DateRange, MonthKey};

/// Everything the store holds; also the snapshot file format
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreData {
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub budgets: Vec<Budget>,
    #[serde(default)]
    pub goals: Vec<Goal>,
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub aggregates: Vec<MonthlyAggregate>,
}

pub struct MemoryStore {
    data: RwLock<StoreData>,
    snapshot: Option<PathBuf>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Volatile store
    pub fn new() -> Self {
        Self {
            data: RwLock::new(StoreData::default()),
            snapshot: None,
        }
    }

    /// Store backed by a snapshot file, loaded now if it exists
    pub async fn open(path: impl Into<PathBuf>) -> CoreResult<Self> {
        let path = path.into();
        let data = match tokio::fs::read_to_string(&path).await {
            Ok(content) => {
                let data: StoreData = serde_json::from_str(&content)?;
                log::info!(
                    "Loaded snapshot {}: {} transactions, {} budgets, {} goals, {} accounts, {} monthly aggregates",
                    path.display(),
                    data.transactions.len(),
                    data.budgets.len(),
                    data.goals.len(),
                    data.accounts.len(),
                    data.aggregates.len()
                );
                data
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No snapshot at {}, starting empty", path.display());
                StoreData::default()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            data: RwLock::new(data),
            snapshot: Some(path),
        })
    }

    /// Expose this store through every store trait
    pub fn into_stores(self: Arc<Self>) -> Stores {
        Stores {
            transactions: self.clone(),
            budgets: self.clone(),
            goals: self.clone(),
            accounts: self.clone(),
            aggregates: self,
        }
    }

    /// Copy of the current data set
    pub async fn dump(&self) -> StoreData {
        self.data.read().await.clone()
    }

    /// Run `change` against the data and persist the result
    async fn mutate<R, F>(&self, change: F) -> CoreResult<R>
    where
        F: FnOnce(&mut StoreData) -> CoreResult<R> + Send,
        R: Send,
    {
        let mut data = self.data.write().await;
        let Some(path) = &self.snapshot else {
            return change(&mut *data);
        };

        let mut candidate = data.clone();
        let result = change(&mut candidate)?;
        write_snapshot(path, &candidate).await?;
        *data = candidate;
        Ok(result)
    }
}

async fn write_snapshot(path: &Path, data: &StoreData) -> CoreResult<()> {
    let failed = |e: &dyn std::fmt::Display| CoreError::StoreError {
        message: format!("Failed to write snapshot {}: {}", path.display(), e),
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| failed(&e))?;
        }
    }
    let json = serde_json::to_vec_pretty(data).map_err(|e| failed(&e))?;
    let tmp = path.with_extension("tmp");
    tokio::fs::write(&tmp, json).await.map_err(|e| failed(&e))?;
    tokio::fs::rename(&tmp, path).await.map_err(|e| failed(&e))?;
    log::trace!("Snapshot written to {}", path.display());
    Ok(())
}

fn find_by_id<T: Owned + Clone>(items: &[T], id: &str) -> Option<T> {
    items.iter().find(|item| item.id() == id).cloned()
}

fn owned_by<T: Owned + Clone>(items: &[T], user_id: &str) -> Vec<T> {
    items
        .iter()
        .filter(|item| item.user_id() == user_id)
        .cloned()
        .collect()
}

fn replace<T: Owned + Clone>(items: &mut [T], item: T, resource: &str) -> CoreResult<T> {
    let slot = items
        .iter_mut()
        .find(|existing| existing.id() == item.id())
        .ok_or_else(|| CoreError::not_found(resource, item.id()))?;
    *slot = item.clone();
    Ok(item)
}

fn remove<T: Owned>(items: &mut Vec<T>, id: &str, resource: &str) -> CoreResult<()> {
    let before = items.len();
    items.retain(|item| item.id() != id);
    if items.len() == before {
        return Err(CoreError::not_found(resource, id));
    }
    Ok(())
}

#[async_trait]
impl TransactionStore for MemoryStore {
    async fn find(&self, user_id: &str, range: Option<DateRange>) -> CoreResult<Vec<Transaction>> {
        let data = self.data.read().await;
        Ok(data
            .transactions
            .iter()
            .filter(|tx| tx.user_id == user_id)
            .filter(|tx| range.map_or(true, |r| r.contains(tx.date)))
            .cloned()
            .collect())
    }

    async fn get(&self, id: &str) -> CoreResult<Option<Transaction>> {
        Ok(find_by_id(&self.data.read().await.transactions, id))
    }

    async fn create(&self, transaction: Transaction) -> CoreResult<Transaction> {
        self.mutate(|data| {
            data.transactions.push(transaction.clone());
            Ok(transaction)
        })
        .await
    }

    async fn update(&self, transaction: Transaction) -> CoreResult<Transaction> {
        self.mutate(|data| replace(&mut data.transactions, transaction, "Transaction")).await
    }

    async fn delete(&self, id: &str) -> CoreResult<()> {
        self.mutate(|data| remove(&mut data.transactions, id, "Transaction")).await
    }
}

fn duplicate_budget(budget: &Budget) -> CoreError {
    CoreError::DuplicateEntry {
        entry: format!("{} budget for {} already exists", budget.period, budget.category),
    }
}

#[async_trait]
impl BudgetStore for MemoryStore {
    async fn find(&self, user_id: &str) -> CoreResult<Vec<Budget>> {
        Ok(owned_by(&self.data.read().await.budgets, user_id))
    }

    async fn find_overlapping(&self, user_id: &str, range: DateRange) -> CoreResult<Vec<Budget>> {
        let data = self.data.read().await;
        Ok(data
            .budgets
            .iter()
            .filter(|b| b.user_id == user_id && b.window().overlaps(&range))
            .cloned()
            .collect())
    }

    async fn get(&self, id: &str) -> CoreResult<Option<Budget>> {
        Ok(find_by_id(&self.data.read().await.budgets, id))
    }

    async fn create(&self, budget: Budget) -> CoreResult<Budget> {
        self.mutate(|data| {
            if data.budgets.iter().any(|b| b.same_slot(&budget)) {
                return Err(duplicate_budget(&budget));
            }
            data.budgets.push(budget.clone());
            Ok(budget)
        })
        .await
    }

    async fn update(&self, budget: Budget) -> CoreResult<Budget> {
        self.mutate(|data| {
            if data
                .budgets
                .iter()
                .any(|b| b.id != budget.id && b.same_slot(&budget))
            {
                return Err(duplicate_budget(&budget));
            }
            replace(&mut data.budgets, budget, "Budget")
        })
        .await
    }

    async fn delete(&self, id: &str) -> CoreResult<()> {
        self.mutate(|data| remove(&mut data.budgets, id, "Budget")).await
    }
}

#[async_trait]
impl GoalStore for MemoryStore {
    async fn find(&self, user_id: &str) -> CoreResult<Vec<Goal>> {
        Ok(owned_by(&self.data.read().await.goals, user_id))
    }

    async fn get(&self, id: &str) -> CoreResult<Option<Goal>> {
        Ok(find_by_id(&self.data.read().await.goals, id))
    }

    async fn create(&self, goal: Goal) -> CoreResult<Goal> {
        self.mutate(|data| {
            data.goals.push(goal.clone());
            Ok(goal)
        })
        .await
    }

    async fn update(&self, goal: Goal) -> CoreResult<Goal> {
        self.mutate(|data| replace(&mut data.goals, goal, "Goal")).await
    }

    async fn delete(&self, id: &str) -> CoreResult<()> {
        self.mutate(|data| remove(&mut data.goals, id, "Goal")).await
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn find(&self, user_id: &str) -> CoreResult<Vec<Account>> {
        Ok(owned_by(&self.data.read().await.accounts, user_id))
    }

    async fn get(&self, id: &str) -> CoreResult<Option<Account>> {
        Ok(find_by_id(&self.data.read().await.accounts, id))
    }

    async fn create(&self, account: Account) -> CoreResult<Account> {
        self.mutate(|data| {
            data.accounts.push(account.clone());
            Ok(account)
        })
        .await
    }

    async fn update(&self, account: Account) -> CoreResult<Account> {
        self.mutate(|data| replace(&mut data.accounts, account, "Account")).await
    }

    async fn delete(&self, id: &str) -> CoreResult<()> {
        self.mutate(|data| remove(&mut data.accounts, id, "Account")).await
    }
}

#[async_trait]
impl AggregateStore for MemoryStore {
    async fn find_one(&self, user_id: &str, month: MonthKey) -> CoreResult<Option<MonthlyAggregate>> {
        let data = self.data.read().await;
        Ok(data
            .aggregates
            .iter()
            .find(|a| a.user_id == user_id && a.key() == month)
            .cloned())
    }

    async fn find(&self, user_id: &str, year: Option<i32>) -> CoreResult<Vec<MonthlyAggregate>> {
        let data = self.data.read().await;
        let mut aggregates: Vec<MonthlyAggregate> = data
            .aggregates
            .iter()
            .filter(|a| a.user_id == user_id && year.map_or(true, |y| a.year == y))
            .cloned()
            .collect();
        aggregates.sort_by_key(|a| a.key());
        Ok(aggregates)
    }

    async fn create(&self, aggregate: MonthlyAggregate) -> CoreResult<MonthlyAggregate> {
        self.mutate(|data| {
            if data
                .aggregates
                .iter()
                .any(|a| a.user_id == aggregate.user_id && a.key() == aggregate.key())
            {
                return Err(CoreError::DuplicateEntry {
                    entry: format!("monthly data for {} already exists", aggregate.month),
                });
            }
            data.aggregates.push(aggregate.clone());
            Ok(aggregate)
        })
        .await
    }

    async fn update(&self, aggregate: MonthlyAggregate) -> CoreResult<MonthlyAggregate> {
        self.mutate(|data| replace(&mut data.aggregates, aggregate, "Monthly data")).await
    }

    async fn latest(&self, user_id: &str) -> CoreResult<Option<MonthlyAggregate>> {
        let data = self.data.read().await;
        Ok(data
            .aggregates
            .iter()
            .filter(|a| a.user_id == user_id)
            .max_by_key(|a| a.key())
            .cloned())
    }
}
