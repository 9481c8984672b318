//! Finance service
//!
//! Wires the statement parser, the stores and the monthly aggregator
//! together. Every operation takes the id of the acting user; records owned
//! by someone else are reported as `Forbidden`.

use budgetweb_config::Config;
use budgetweb_parser::ParserRef;
use rust_decimal::Decimal;

use crate::aggregator::{MonthlyAggregator, RecomputeReport};
use crate::error::{CoreError, CoreResult, DefaultErrorLogger, ErrorContext, ErrorLogger};
use crate::import::{import_statement, PreparedImport};
use crate::models::{
    Account, AccountPatch, Budget, BudgetPatch, Goal, GoalPatch, MonthlyAggregate,
    MonthlyAggregateInput, NewAccount, NewBudget, NewGoal, NewTransaction, Owned, Transaction,
    TransactionPatch,
};
use crate::reports::{paginate, FinancialStats, TransactionPage, TransactionQuery};
use crate::store::Stores;
use crate::time::{DateRange, MonthKey};

/// Return the record when it exists and belongs to `user_id`
fn owned_record<T: Owned>(record: Option<T>, user_id: &str, resource: &str, id: &str) -> CoreResult<T> {
    let record = record.ok_or_else(|| CoreError::not_found(resource, id))?;
    if record.user_id() != user_id {
        return Err(CoreError::Forbidden {
            resource: resource.to_string(),
            id: id.to_string(),
        });
    }
    Ok(record)
}

pub struct Finance {
    config: Config,
    parser: ParserRef,
    stores: Stores,
    aggregator: MonthlyAggregator,
    error_logger: Box<dyn ErrorLogger>,
}

impl Finance {
    pub fn new(config: Config, parser: ParserRef, stores: Stores) -> Self {
        let aggregator = MonthlyAggregator::new(
            stores.transactions.clone(),
            stores.budgets.clone(),
            stores.aggregates.clone(),
            config.aggregation.failure_policy,
        );
        Self {
            config,
            parser,
            stores,
            aggregator,
            error_logger: Box::new(DefaultErrorLogger),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn aggregator(&self) -> &MonthlyAggregator {
        &self.aggregator
    }

    async fn refresh_months(&self, user_id: &str, months: Vec<MonthKey>, operation: &str) -> CoreResult<()> {
        if let Err(e) = self.aggregator.recompute_months(user_id, months).await {
            self.error_logger
                .log_error(&e, &ErrorContext::new(operation).with_user_id(user_id));
            return Err(e);
        }
        Ok(())
    }

    /// Refresh the existing aggregates of months touched by any of `windows`
    async fn refresh_budget_windows(&self, user_id: &str, windows: &[DateRange], operation: &str) -> CoreResult<()> {
        let months: Vec<MonthKey> = self
            .stores
            .aggregates
            .find(user_id, None)
            .await?
            .iter()
            .map(MonthlyAggregate::key)
            .filter(|key| {
                key.window()
                    .map_or(false, |month| windows.iter().any(|w| w.overlaps(&month)))
            })
            .collect();

        if months.is_empty() {
            return Ok(());
        }
        log::debug!("Budget change touches {} aggregated months", months.len());
        self.refresh_months(user_id, months, operation).await
    }

    // ==================== Statement import ====================

    /// Parse a pasted statement, store its transactions and update their months
    pub async fn import_statement(
        &self,
        user_id: &str,
        raw: &str,
        starting_balance: Option<Decimal>,
    ) -> CoreResult<PreparedImport> {
        if raw.trim().is_empty() {
            return Err(CoreError::validation("Please provide bank statement data"));
        }

        let starting_balance = starting_balance.unwrap_or(self.config.import.default_starting_balance);
        let prepared = import_statement(self.parser.as_ref(), raw, user_id, starting_balance);

        let mut stored = Vec::with_capacity(prepared.transactions.len());
        let mut failure = None;
        for tx in prepared.transactions {
            match self.stores.transactions.create(tx).await {
                Ok(tx) => stored.push(tx),
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }

        // months of whatever was stored stay consistent even when the import stops early
        let months = stored.iter().map(Transaction::month).collect();
        self.refresh_months(user_id, months, "import_statement").await?;

        if let Some(e) = failure {
            self.error_logger.log_error(
                &e,
                &ErrorContext::new("import_statement")
                    .with_user_id(user_id)
                    .with_data("stored", serde_json::json!(stored.len())),
            );
            return Err(e);
        }

        if !prepared.skipped.is_empty() {
            let lines: Vec<usize> = prepared.skipped.iter().map(|s| s.line_number).collect();
            self.error_logger.log_warning(
                &format!("{} statement lines skipped", lines.len()),
                &ErrorContext::new("import_statement")
                    .with_user_id(user_id)
                    .with_data("lines", serde_json::json!(lines)),
            );
        }

        log::info!(
            "Imported {} transactions for user {} ({} lines skipped)",
            stored.len(),
            user_id,
            prepared.skipped.len()
        );

        Ok(PreparedImport {
            transactions: stored,
            summary: prepared.summary,
            skipped: prepared.skipped,
        })
    }

    // ==================== Transactions ====================

    pub async fn list_transactions(&self, user_id: &str, query: &TransactionQuery) -> CoreResult<TransactionPage> {
        let pagination = &self.config.pagination;
        let limit = query
            .limit
            .filter(|l| *l > 0)
            .unwrap_or(pagination.default_limit)
            .min(pagination.max_limit);
        let page = query.page.unwrap_or(1);

        let transactions: Vec<Transaction> = self
            .stores
            .transactions
            .find(user_id, None)
            .await?
            .into_iter()
            .filter(|tx| query.matches(tx))
            .collect();

        Ok(paginate(transactions, page, limit))
    }

    pub async fn get_transaction(&self, user_id: &str, id: &str) -> CoreResult<Transaction> {
        let record = self.stores.transactions.get(id).await?;
        owned_record(record, user_id, "Transaction", id)
    }

    pub async fn add_transaction(&self, user_id: &str, input: NewTransaction) -> CoreResult<Transaction> {
        let tx = input.into_transaction(user_id)?;
        let tx = self.stores.transactions.create(tx).await?;
        self.refresh_months(user_id, vec![tx.month()], "add_transaction").await?;
        Ok(tx)
    }

    /// Apply a patch; both the old and the new month are recomputed
    pub async fn update_transaction(
        &self,
        user_id: &str,
        id: &str,
        patch: TransactionPatch,
    ) -> CoreResult<Transaction> {
        let mut tx = self.get_transaction(user_id, id).await?;
        let old_month = tx.month();
        patch.apply(&mut tx)?;
        let tx = self.stores.transactions.update(tx).await?;
        self.refresh_months(user_id, vec![old_month, tx.month()], "update_transaction")
            .await?;
        Ok(tx)
    }

    pub async fn delete_transaction(&self, user_id: &str, id: &str) -> CoreResult<()> {
        let tx = self.get_transaction(user_id, id).await?;
        self.stores.transactions.delete(id).await?;
        self.refresh_months(user_id, vec![tx.month()], "delete_transaction").await
    }

    // ==================== Budgets ====================

    pub async fn budgets(&self, user_id: &str) -> CoreResult<Vec<Budget>> {
        self.stores.budgets.find(user_id).await
    }

    pub async fn add_budget(&self, user_id: &str, input: NewBudget) -> CoreResult<Budget> {
        let budget = self.stores.budgets.create(input.into_budget(user_id)?).await?;
        self.refresh_budget_windows(user_id, &[budget.window()], "add_budget")
            .await?;
        Ok(budget)
    }

    pub async fn update_budget(&self, user_id: &str, id: &str, patch: BudgetPatch) -> CoreResult<Budget> {
        let record = self.stores.budgets.get(id).await?;
        let mut budget = owned_record(record, user_id, "Budget", id)?;
        let old_window = budget.window();
        patch.apply(&mut budget)?;
        let budget = self.stores.budgets.update(budget).await?;
        self.refresh_budget_windows(user_id, &[old_window, budget.window()], "update_budget")
            .await?;
        Ok(budget)
    }

    pub async fn delete_budget(&self, user_id: &str, id: &str) -> CoreResult<()> {
        let record = self.stores.budgets.get(id).await?;
        let budget = owned_record(record, user_id, "Budget", id)?;
        self.stores.budgets.delete(id).await?;
        self.refresh_budget_windows(user_id, &[budget.window()], "delete_budget")
            .await
    }

    // ==================== Goals ====================

    pub async fn goals(&self, user_id: &str) -> CoreResult<Vec<Goal>> {
        self.stores.goals.find(user_id).await
    }

    pub async fn add_goal(&self, user_id: &str, input: NewGoal) -> CoreResult<Goal> {
        self.stores.goals.create(input.into_goal(user_id)?).await
    }

    pub async fn update_goal(&self, user_id: &str, id: &str, patch: GoalPatch) -> CoreResult<Goal> {
        let record = self.stores.goals.get(id).await?;
        let mut goal = owned_record(record, user_id, "Goal", id)?;
        patch.apply(&mut goal)?;
        self.stores.goals.update(goal).await
    }

    pub async fn delete_goal(&self, user_id: &str, id: &str) -> CoreResult<()> {
        let record = self.stores.goals.get(id).await?;
        owned_record(record, user_id, "Goal", id)?;
        self.stores.goals.delete(id).await
    }

    // ==================== Accounts ====================

    pub async fn accounts(&self, user_id: &str) -> CoreResult<Vec<Account>> {
        self.stores.accounts.find(user_id).await
    }

    pub async fn add_account(&self, user_id: &str, input: NewAccount) -> CoreResult<Account> {
        let account = input.into_account(user_id, &self.config.currency.default_currency)?;
        self.stores.accounts.create(account).await
    }

    pub async fn update_account(&self, user_id: &str, id: &str, patch: AccountPatch) -> CoreResult<Account> {
        let record = self.stores.accounts.get(id).await?;
        let mut account = owned_record(record, user_id, "Account", id)?;
        patch.apply(&mut account)?;
        self.stores.accounts.update(account).await
    }

    pub async fn delete_account(&self, user_id: &str, id: &str) -> CoreResult<()> {
        let record = self.stores.accounts.get(id).await?;
        owned_record(record, user_id, "Account", id)?;
        self.stores.accounts.delete(id).await
    }

    // ==================== Monthly data ====================

    pub async fn monthly(&self, user_id: &str, year: Option<i32>) -> CoreResult<Vec<MonthlyAggregate>> {
        self.stores.aggregates.find(user_id, year).await
    }

    /// Create or overwrite a month with manually supplied figures
    pub async fn upsert_monthly(&self, user_id: &str, input: MonthlyAggregateInput) -> CoreResult<MonthlyAggregate> {
        let key = input.month_key()?;
        let _guard = self.aggregator.locks().lock(user_id).await;

        match self.stores.aggregates.find_one(user_id, key).await? {
            Some(mut aggregate) => {
                input.apply(&mut aggregate)?;
                self.stores.aggregates.update(aggregate).await
            }
            None => {
                let mut aggregate = MonthlyAggregate::empty(user_id, key);
                input.apply(&mut aggregate)?;
                self.stores.aggregates.create(aggregate).await
            }
        }
    }

    /// Recompute every month of the user from scratch
    pub async fn rebuild_monthly(&self, user_id: &str) -> CoreResult<RecomputeReport> {
        self.aggregator.recompute(user_id).await.map_err(|e| {
            self.error_logger
                .log_error(&e, &ErrorContext::new("rebuild_monthly").with_user_id(user_id));
            e
        })
    }

    // ==================== Stats ====================

    pub async fn stats(&self, user_id: &str) -> CoreResult<FinancialStats> {
        let transactions = self.stores.transactions.find(user_id, None).await?;
        let latest = self.stores.aggregates.latest(user_id).await?;
        let goals = self.stores.goals.find(user_id).await?;
        FinancialStats::compute(&transactions, latest.as_ref(), &goals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use budgetweb_parser::{Category, DefaultStatementParser};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn jan() -> MonthKey {
        MonthKey::new(2024, 0).unwrap()
    }

    fn finance() -> Finance {
        let store = Arc::new(MemoryStore::new());
        Finance::new(Config::default(), Arc::new(DefaultStatementParser), store.into_stores())
    }

    fn new_tx(day: NaiveDate, description: &str, amount: Decimal) -> NewTransaction {
        NewTransaction {
            date: Some(day),
            description: description.to_string(),
            amount,
            ..Default::default()
        }
    }

    async fn month(finance: &Finance, user: &str, key: MonthKey) -> Option<MonthlyAggregate> {
        finance.stores.aggregates.find_one(user, key).await.unwrap()
    }

    #[tokio::test]
    async fn test_add_transaction_updates_its_month() {
        let finance = finance();
        finance
            .add_transaction("u1", new_tx(date(2024, 1, 3), "Salary", dec!(2000)))
            .await
            .unwrap();
        finance
            .add_transaction("u1", new_tx(date(2024, 1, 9), "Grocery run", dec!(-150)))
            .await
            .unwrap();

        let aggregate = month(&finance, "u1", jan()).await.unwrap();
        assert_eq!(aggregate.income, dec!(2000));
        assert_eq!(aggregate.expenses, dec!(150));
        assert_eq!(aggregate.category_spending[0].category, Category::Food);
    }

    #[tokio::test]
    async fn test_moving_a_transaction_refreshes_both_months() {
        let finance = finance();
        let tx = finance
            .add_transaction("u1", new_tx(date(2024, 1, 9), "Cinema", dec!(-20)))
            .await
            .unwrap();

        let patch = TransactionPatch {
            date: Some(date(2024, 2, 2)),
            ..Default::default()
        };
        finance.update_transaction("u1", &tx.id, patch).await.unwrap();

        let january = month(&finance, "u1", jan()).await.unwrap();
        assert_eq!(january.expenses, dec!(0));
        let february = month(&finance, "u1", MonthKey::new(2024, 1).unwrap()).await.unwrap();
        assert_eq!(february.expenses, dec!(20));
    }

    #[tokio::test]
    async fn test_delete_transaction_zeroes_month() {
        let finance = finance();
        let tx = finance
            .add_transaction("u1", new_tx(date(2024, 1, 9), "Pharmacy", dec!(-12)))
            .await
            .unwrap();
        finance.delete_transaction("u1", &tx.id).await.unwrap();

        let january = month(&finance, "u1", jan()).await.unwrap();
        assert_eq!(january.expenses, dec!(0));
        assert!(finance.get_transaction("u1", &tx.id).await.is_err());
    }

    #[tokio::test]
    async fn test_foreign_records_are_forbidden() {
        let finance = finance();
        let tx = finance
            .add_transaction("u1", new_tx(date(2024, 1, 9), "Rent", dec!(-900)))
            .await
            .unwrap();

        let err = finance.delete_transaction("u2", &tx.id).await.unwrap_err();
        assert!(matches!(err, CoreError::Forbidden { .. }));

        let err = finance
            .update_transaction("u1", "missing", TransactionPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_import_persists_and_aggregates() {
        let finance = finance();
        let raw = "Date,Description,Amount\n\
                   02/01/2024,Payroll,1000\n\
                   05/01/2024,Netflix,-15.99\n\
                   01/02/2024,Rent,-800\n\
                   garbage";
        let outcome = finance
            .import_statement("u1", raw, Some(dec!(50)))
            .await
            .unwrap();

        assert_eq!(outcome.transactions.len(), 3);
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.summary.ending_balance, dec!(234.01));

        let aggregates = finance.monthly("u1", Some(2024)).await.unwrap();
        assert_eq!(aggregates.len(), 2);
        assert_eq!(aggregates[0].month, "Jan 2024");
        assert_eq!(aggregates[1].expenses, dec!(800));
    }

    /// Transaction store that refuses every create after the first `limit`
    struct LimitedTransactions {
        inner: Arc<MemoryStore>,
        limit: usize,
        created: std::sync::atomic::AtomicUsize,
    }

    #[async_trait::async_trait]
    impl crate::store::TransactionStore for LimitedTransactions {
        async fn find(&self, user_id: &str, range: Option<DateRange>) -> CoreResult<Vec<Transaction>> {
            crate::store::TransactionStore::find(self.inner.as_ref(), user_id, range).await
        }
        async fn get(&self, id: &str) -> CoreResult<Option<Transaction>> {
            crate::store::TransactionStore::get(self.inner.as_ref(), id).await
        }
        async fn create(&self, transaction: Transaction) -> CoreResult<Transaction> {
            let seen = self.created.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            if seen >= self.limit {
                return Err(CoreError::StoreError {
                    message: "disk full".to_string(),
                });
            }
            crate::store::TransactionStore::create(self.inner.as_ref(), transaction).await
        }
        async fn update(&self, transaction: Transaction) -> CoreResult<Transaction> {
            crate::store::TransactionStore::update(self.inner.as_ref(), transaction).await
        }
        async fn delete(&self, id: &str) -> CoreResult<()> {
            crate::store::TransactionStore::delete(self.inner.as_ref(), id).await
        }
    }

    #[tokio::test]
    async fn test_interrupted_import_still_aggregates_stored_months() {
        let store = Arc::new(MemoryStore::new());
        let mut stores = store.clone().into_stores();
        stores.transactions = Arc::new(LimitedTransactions {
            inner: store.clone(),
            limit: 2,
            created: Default::default(),
        });
        let finance = Finance::new(Config::default(), Arc::new(DefaultStatementParser), stores);

        let raw = "02/01/2024,Payroll,1000\n03/02/2024,Rent,-800\n04/03/2024,Coffee,-4";
        let err = finance.import_statement("u1", raw, None).await.unwrap_err();
        assert!(matches!(err, CoreError::StoreError { .. }));

        let aggregates = finance.monthly("u1", Some(2024)).await.unwrap();
        let months: Vec<&str> = aggregates.iter().map(|a| a.month.as_str()).collect();
        assert_eq!(months, vec!["Jan 2024", "Feb 2024"]);
        assert_eq!(aggregates[1].expenses, dec!(800));
    }

    #[tokio::test]
    async fn test_import_skips_lines_without_description() {
        let finance = finance();
        let outcome = finance
            .import_statement("u1", "2024-01-01,,-5\n2024-01-02,Bakery,-3", None)
            .await
            .unwrap();

        assert_eq!(outcome.transactions.len(), 1);
        assert_eq!(outcome.skipped[0].line_number, 1);
        let stored = finance
            .list_transactions("u1", &TransactionQuery::default())
            .await
            .unwrap();
        assert!(stored.transactions.iter().all(|t| !t.description.is_empty()));
    }

    #[tokio::test]
    async fn test_import_requires_data() {
        let finance = finance();
        let err = finance.import_statement("u1", "  \n", None).await.unwrap_err();
        assert!(matches!(err, CoreError::ValidationError { .. }));
    }

    #[tokio::test]
    async fn test_budget_changes_refresh_aggregates() {
        let finance = finance();
        finance
            .add_transaction("u1", new_tx(date(2024, 1, 9), "Supermarket", dec!(-60)))
            .await
            .unwrap();

        let budget = finance
            .add_budget(
                "u1",
                NewBudget {
                    category: Category::Food,
                    amount: dec!(250),
                    start_date: Some(date(2024, 1, 1)),
                    end_date: Some(date(2024, 1, 31)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let january = month(&finance, "u1", jan()).await.unwrap();
        assert_eq!(january.category_spending[0].budget, dec!(250));

        finance.delete_budget("u1", &budget.id).await.unwrap();
        let january = month(&finance, "u1", jan()).await.unwrap();
        assert_eq!(january.category_spending[0].budget, dec!(0));
    }

    #[tokio::test]
    async fn test_duplicate_budget() {
        let finance = finance();
        let input = NewBudget {
            category: Category::Housing,
            amount: dec!(1000),
            ..Default::default()
        };
        finance.add_budget("u1", input.clone()).await.unwrap();
        let err = finance.add_budget("u1", input).await.unwrap_err();
        assert!(matches!(err, CoreError::DuplicateEntry { .. }));
    }

    #[tokio::test]
    async fn test_manual_monthly_upsert_by_label() {
        let finance = finance();
        let input = MonthlyAggregateInput {
            month: Some("Jan 2024".to_string()),
            income: dec!(3000),
            expenses: dec!(2000),
            net_worth: Some(dec!(15000)),
            ..Default::default()
        };
        let created = finance.upsert_monthly("u1", input.clone()).await.unwrap();
        assert_eq!(created.key(), jan());
        assert!(!created.is_auto_generated);

        let updated = finance.upsert_monthly("u1", input).await.unwrap();
        assert_eq!(updated.id, created.id);

        // a later transaction takes the month over but keeps net worth
        finance
            .add_transaction("u1", new_tx(date(2024, 1, 9), "Salary", dec!(100)))
            .await
            .unwrap();
        let january = month(&finance, "u1", jan()).await.unwrap();
        assert_eq!(january.income, dec!(100));
        assert_eq!(january.net_worth, dec!(15000));
        assert!(january.is_auto_generated);
    }

    #[tokio::test]
    async fn test_rebuild_and_stats() {
        let finance = finance();
        finance
            .add_transaction("u1", new_tx(date(2024, 1, 9), "Salary", dec!(1000)))
            .await
            .unwrap();
        finance
            .add_transaction("u1", new_tx(date(2024, 2, 9), "Doctor visit", dec!(-100)))
            .await
            .unwrap();
        finance
            .add_goal(
                "u1",
                NewGoal {
                    name: "Car".to_string(),
                    icon: None,
                    target_amount: dec!(5000),
                    current_amount: dec!(0),
                    target_date: date(2025, 1, 1),
                    description: None,
                    status: Default::default(),
                    category: Default::default(),
                },
            )
            .await
            .unwrap();

        let report = finance.rebuild_monthly("u1").await.unwrap();
        assert_eq!(report.updated.len(), 2);

        let stats = finance.stats("u1").await.unwrap();
        assert_eq!(stats.total_income, dec!(1000));
        assert_eq!(stats.total_expenses, dec!(100));
        assert_eq!(stats.category_spending[0].category, Category::Healthcare);
        // latest month is February, which has no income
        assert_eq!(stats.savings_rate, dec!(0));
        assert_eq!(stats.active_goals, 1);
    }

    #[tokio::test]
    async fn test_list_transactions_clamps_limit() {
        let finance = finance();
        for day in 1..=3 {
            finance
                .add_transaction("u1", new_tx(date(2024, 1, day), "Coffee", dec!(-3)))
                .await
                .unwrap();
        }

        let query = TransactionQuery {
            limit: Some(10_000),
            ..Default::default()
        };
        let page = finance.list_transactions("u1", &query).await.unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.transactions[0].date, date(2024, 1, 3));

        let query = TransactionQuery {
            limit: Some(2),
            page: Some(2),
            ..Default::default()
        };
        let page = finance.list_transactions("u1", &query).await.unwrap();
        assert_eq!(page.transactions.len(), 1);
        assert!(page.pagination.prev.is_some());
        assert!(finance.list_transactions("u2", &query).await.unwrap().transactions.is_empty());
    }

    #[tokio::test]
    async fn test_accounts_use_default_currency() {
        let finance = finance();
        let account = finance
            .add_account(
                "u1",
                NewAccount {
                    name: "Everyday".to_string(),
                    account_type: crate::types::AccountType::Checking,
                    institution: "First Bank".to_string(),
                    balance: dec!(10),
                    currency: None,
                    is_active: None,
                    external_id: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(account.currency, "USD");

        let err = finance.delete_account("u2", &account.id).await.unwrap_err();
        assert!(matches!(err, CoreError::Forbidden { .. }));
        finance.delete_account("u1", &account.id).await.unwrap();
        assert!(finance.accounts("u1").await.unwrap().is_empty());
    }
}
