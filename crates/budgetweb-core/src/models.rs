//! Finance records and their create/update inputs
//!
//! Every record is owned by one user. Inputs (`New*`) are what the API
//! deserializes; patches (`*Patch`) carry only the fields a caller wants to
//! change. Field bounds are checked by each record's `validate`.

use budgetweb_parser::Category;
use budgetweb_utils::{char_len_exceeds, generate_id};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::time::{DateRange, MonthKey};
use crate::types::{AccountType, BudgetPeriod, GoalCategory, GoalStatus, RecurringFrequency};

pub const MAX_DESCRIPTION_LEN: usize = 100;
pub const MAX_TRANSACTION_NOTES_LEN: usize = 500;
pub const MAX_BUDGET_NOTES_LEN: usize = 300;
pub const MAX_GOAL_NAME_LEN: usize = 50;
pub const MAX_GOAL_DESCRIPTION_LEN: usize = 300;
pub const DEFAULT_GOAL_ICON: &str = "fa-home";

/// A record that belongs to one user
pub trait Owned {
    fn id(&self) -> &str;
    fn user_id(&self) -> &str;
}

macro_rules! impl_owned {
    ($($ty:ty),*) => {
        $(impl Owned for $ty {
            fn id(&self) -> &str {
                &self.id
            }
            fn user_id(&self) -> &str {
                &self.user_id
            }
        })*
    };
}

impl_owned!(Transaction, Budget, Goal, Account, MonthlyAggregate);

fn require_text(field: &str, value: &str) -> CoreResult<()> {
    if value.trim().is_empty() {
        return Err(CoreError::validation(format!("{} is required", field)));
    }
    Ok(())
}

fn limit_text(field: &str, value: Option<&str>, max: usize) -> CoreResult<()> {
    match value {
        Some(v) if char_len_exceeds(v, max) => Err(CoreError::validation(format!(
            "{} cannot be more than {} characters",
            field, max
        ))),
        _ => Ok(()),
    }
}

fn non_negative(field: &str, value: Decimal) -> CoreResult<()> {
    if value < Decimal::ZERO {
        return Err(CoreError::validation(format!("{} must be positive", field)));
    }
    Ok(())
}

// ==================== Transactions ====================

/// A single income (positive amount) or expense (negative amount)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub user_id: String,
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    pub category: Category,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default)]
    pub recurring_frequency: RecurringFrequency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Calendar month the transaction falls in
    pub fn month(&self) -> MonthKey {
        MonthKey::of(self.date)
    }

    pub fn is_income(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    pub fn is_expense(&self) -> bool {
        self.amount < Decimal::ZERO
    }

    pub fn validate(&self) -> CoreResult<()> {
        require_text("Description", &self.description)?;
        limit_text("Description", Some(&self.description), MAX_DESCRIPTION_LEN)?;
        limit_text("Notes", self.notes.as_deref(), MAX_TRANSACTION_NOTES_LEN)
    }
}

/// Input for a manually entered transaction
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewTransaction {
    /// Defaults to today
    #[serde(default)]
    pub date: Option<NaiveDate>,
    pub description: String,
    pub amount: Decimal,
    /// Classified from the description when absent
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default)]
    pub recurring_frequency: RecurringFrequency,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewTransaction {
    pub fn into_transaction(self, user_id: &str) -> CoreResult<Transaction> {
        let category = self
            .category
            .unwrap_or_else(|| budgetweb_parser::classify(&self.description));
        let transaction = Transaction {
            id: generate_id(),
            user_id: user_id.to_string(),
            date: self.date.unwrap_or_else(|| Utc::now().date_naive()),
            description: self.description.trim().to_string(),
            amount: self.amount,
            category,
            is_recurring: self.is_recurring,
            recurring_frequency: self.recurring_frequency,
            notes: self.notes,
            created_at: Utc::now(),
        };
        transaction.validate()?;
        Ok(transaction)
    }
}

/// Partial update of a transaction
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionPatch {
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    pub amount: Option<Decimal>,
    pub category: Option<Category>,
    pub is_recurring: Option<bool>,
    pub recurring_frequency: Option<RecurringFrequency>,
    pub notes: Option<String>,
}

impl TransactionPatch {
    pub fn apply(self, transaction: &mut Transaction) -> CoreResult<()> {
        if let Some(date) = self.date {
            transaction.date = date;
        }
        if let Some(description) = self.description {
            transaction.description = description.trim().to_string();
        }
        if let Some(amount) = self.amount {
            transaction.amount = amount;
        }
        if let Some(category) = self.category {
            transaction.category = category;
        }
        if let Some(is_recurring) = self.is_recurring {
            transaction.is_recurring = is_recurring;
        }
        if let Some(frequency) = self.recurring_frequency {
            transaction.recurring_frequency = frequency;
        }
        if self.notes.is_some() {
            transaction.notes = self.notes;
        }
        transaction.validate()
    }
}

// ==================== Budgets ====================

/// Spending limit for one category over a date window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: String,
    pub user_id: String,
    pub category: Category,
    pub amount: Decimal,
    pub period: BudgetPeriod,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Budget {
    pub fn window(&self) -> DateRange {
        DateRange::new(self.start_date, self.end_date)
    }

    /// Budgets are unique per (user, category, period)
    pub fn same_slot(&self, other: &Budget) -> bool {
        self.user_id == other.user_id
            && self.category == other.category
            && self.period == other.period
    }

    pub fn validate(&self) -> CoreResult<()> {
        non_negative("Budget amount", self.amount)?;
        if self.start_date > self.end_date {
            return Err(CoreError::validation("Budget start date must not be after its end date"));
        }
        limit_text("Notes", self.notes.as_deref(), MAX_BUDGET_NOTES_LEN)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewBudget {
    pub category: Category,
    pub amount: Decimal,
    #[serde(default)]
    pub period: BudgetPeriod,
    /// Defaults to the first day of the current month
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// Defaults to the last day of the current month
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewBudget {
    pub fn into_budget(self, user_id: &str) -> CoreResult<Budget> {
        let current = DateRange::current_month();
        let budget = Budget {
            id: generate_id(),
            user_id: user_id.to_string(),
            category: self.category,
            amount: self.amount,
            period: self.period,
            start_date: self.start_date.unwrap_or(current.start),
            end_date: self.end_date.unwrap_or(current.end),
            notes: self.notes,
            created_at: Utc::now(),
        };
        budget.validate()?;
        Ok(budget)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BudgetPatch {
    pub category: Option<Category>,
    pub amount: Option<Decimal>,
    pub period: Option<BudgetPeriod>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl BudgetPatch {
    pub fn apply(self, budget: &mut Budget) -> CoreResult<()> {
        if let Some(category) = self.category {
            budget.category = category;
        }
        if let Some(amount) = self.amount {
            budget.amount = amount;
        }
        if let Some(period) = self.period {
            budget.period = period;
        }
        if let Some(start) = self.start_date {
            budget.start_date = start;
        }
        if let Some(end) = self.end_date {
            budget.end_date = end;
        }
        if self.notes.is_some() {
            budget.notes = self.notes;
        }
        budget.validate()
    }
}

// ==================== Goals ====================

/// A savings target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub icon: String,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    pub target_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: GoalStatus,
    pub category: GoalCategory,
    pub created_at: DateTime<Utc>,
}

impl Goal {
    pub fn is_active(&self) -> bool {
        self.status == GoalStatus::InProgress
    }

    /// Progress towards the target in percent, capped at 100
    pub fn progress_percent(&self) -> Decimal {
        if self.target_amount <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        let percent = self
            .current_amount
            .checked_div(self.target_amount)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .unwrap_or(Decimal::ONE_HUNDRED);
        percent.min(Decimal::ONE_HUNDRED).round_dp(2)
    }

    pub fn validate(&self) -> CoreResult<()> {
        require_text("Goal name", &self.name)?;
        limit_text("Goal name", Some(&self.name), MAX_GOAL_NAME_LEN)?;
        non_negative("Target amount", self.target_amount)?;
        non_negative("Current amount", self.current_amount)?;
        limit_text("Description", self.description.as_deref(), MAX_GOAL_DESCRIPTION_LEN)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewGoal {
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
    pub target_amount: Decimal,
    #[serde(default)]
    pub current_amount: Decimal,
    pub target_date: NaiveDate,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: GoalStatus,
    #[serde(default)]
    pub category: GoalCategory,
}

impl NewGoal {
    pub fn into_goal(self, user_id: &str) -> CoreResult<Goal> {
        let goal = Goal {
            id: generate_id(),
            user_id: user_id.to_string(),
            name: self.name.trim().to_string(),
            icon: self.icon.unwrap_or_else(|| DEFAULT_GOAL_ICON.to_string()),
            target_amount: self.target_amount,
            current_amount: self.current_amount,
            target_date: self.target_date,
            description: self.description,
            status: self.status,
            category: self.category,
            created_at: Utc::now(),
        };
        goal.validate()?;
        Ok(goal)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GoalPatch {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub target_amount: Option<Decimal>,
    pub current_amount: Option<Decimal>,
    pub target_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub status: Option<GoalStatus>,
    pub category: Option<GoalCategory>,
}

impl GoalPatch {
    pub fn apply(self, goal: &mut Goal) -> CoreResult<()> {
        if let Some(name) = self.name {
            goal.name = name.trim().to_string();
        }
        if let Some(icon) = self.icon {
            goal.icon = icon;
        }
        if let Some(target) = self.target_amount {
            goal.target_amount = target;
        }
        if let Some(current) = self.current_amount {
            goal.current_amount = current;
        }
        if let Some(date) = self.target_date {
            goal.target_date = date;
        }
        if self.description.is_some() {
            goal.description = self.description;
        }
        if let Some(status) = self.status {
            goal.status = status;
        }
        if let Some(category) = self.category {
            goal.category = category;
        }
        goal.validate()
    }
}

// ==================== Accounts ====================

/// A bank or other financial account
///
/// Linked accounts (`is_manual == false`) are managed by a bank connection;
/// their `institution` and `external_id` cannot be edited by users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub account_type: AccountType,
    pub institution: String,
    pub balance: Decimal,
    pub currency: String,
    pub is_active: bool,
    pub last_updated: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    pub is_manual: bool,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn validate(&self) -> CoreResult<()> {
        require_text("Account name", &self.name)?;
        require_text("Institution", &self.institution)?;
        require_text("Currency", &self.currency)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAccount {
    pub name: String,
    pub account_type: AccountType,
    pub institution: String,
    #[serde(default)]
    pub balance: Decimal,
    /// Defaults to the configured currency
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub external_id: Option<String>,
}

impl NewAccount {
    /// Build a manual account; accounts created by users are never linked
    pub fn into_account(self, user_id: &str, default_currency: &str) -> CoreResult<Account> {
        let now = Utc::now();
        let account = Account {
            id: generate_id(),
            user_id: user_id.to_string(),
            name: self.name.trim().to_string(),
            account_type: self.account_type,
            institution: self.institution.trim().to_string(),
            balance: self.balance,
            currency: self.currency.unwrap_or_else(|| default_currency.to_string()),
            is_active: self.is_active.unwrap_or(true),
            last_updated: now,
            external_id: self.external_id,
            is_manual: true,
            created_at: now,
        };
        account.validate()?;
        Ok(account)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountPatch {
    pub name: Option<String>,
    pub account_type: Option<AccountType>,
    pub institution: Option<String>,
    pub balance: Option<Decimal>,
    pub currency: Option<String>,
    pub is_active: Option<bool>,
    pub external_id: Option<String>,
}

impl AccountPatch {
    pub fn apply(self, account: &mut Account) -> CoreResult<()> {
        if let Some(name) = self.name {
            account.name = name.trim().to_string();
        }
        if let Some(account_type) = self.account_type {
            account.account_type = account_type;
        }
        if let Some(balance) = self.balance {
            account.balance = balance;
        }
        if let Some(currency) = self.currency {
            account.currency = currency;
        }
        if let Some(is_active) = self.is_active {
            account.is_active = is_active;
        }
        if account.is_manual {
            if let Some(institution) = self.institution {
                account.institution = institution.trim().to_string();
            }
            if self.external_id.is_some() {
                account.external_id = self.external_id;
            }
        } else if self.institution.is_some() || self.external_id.is_some() {
            log::debug!(
                "Ignoring institution/external id change on linked account {}",
                account.id
            );
        }
        account.last_updated = Utc::now();
        account.validate()
    }
}

// ==================== Monthly aggregates ====================

/// Spending of one category within a month, next to its budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySpend {
    pub category: Category,
    pub amount: Decimal,
    #[serde(default)]
    pub budget: Decimal,
}

/// Rollup of one user's month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyAggregate {
    pub id: String,
    pub user_id: String,
    /// Display label, e.g. "Jan 2024"
    pub month: String,
    pub year: i32,
    /// 0 = January
    pub month_num: u32,
    pub income: Decimal,
    pub expenses: Decimal,
    pub savings: Decimal,
    pub savings_rate: Decimal,
    #[serde(default)]
    pub net_worth: Decimal,
    #[serde(default)]
    pub category_spending: Vec<CategorySpend>,
    pub is_auto_generated: bool,
}

impl MonthlyAggregate {
    pub fn key(&self) -> MonthKey {
        MonthKey {
            year: self.year,
            month_num: self.month_num,
        }
    }
}

/// `total + amount`, rejected as a validation error when it overflows
pub fn add_amount(total: Decimal, amount: Decimal, what: &str) -> CoreResult<Decimal> {
    total
        .checked_add(amount)
        .ok_or_else(|| CoreError::validation(format!("{} out of range", what)))
}

/// Savings as a percentage of income; zero when there is no income
pub fn savings_rate(income: Decimal, savings: Decimal) -> Decimal {
    if income <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    savings
        .checked_div(income)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or_default()
}

/// Manually supplied monthly figures
///
/// The month is given either as a `"Jan 2024"` label or as `year` plus
/// zero-based `month_num`; the label wins when both are present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MonthlyAggregateInput {
    #[serde(default)]
    pub month: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub month_num: Option<u32>,
    #[serde(default)]
    pub income: Decimal,
    #[serde(default)]
    pub expenses: Decimal,
    #[serde(default)]
    pub savings: Option<Decimal>,
    #[serde(default)]
    pub savings_rate: Option<Decimal>,
    #[serde(default)]
    pub net_worth: Option<Decimal>,
    #[serde(default)]
    pub category_spending: Option<Vec<CategorySpend>>,
}

impl MonthlyAggregateInput {
    pub fn month_key(&self) -> CoreResult<MonthKey> {
        if let Some(key) = self.month.as_deref().and_then(MonthKey::from_label) {
            return Ok(key);
        }
        match (self.year, self.month_num) {
            (Some(year), Some(month_num)) => MonthKey::new(year, month_num).ok_or_else(|| {
                CoreError::validation(format!("Invalid month: year {} month {}", year, month_num))
            }),
            _ => Err(CoreError::validation(
                "Provide a month label such as \"Jan 2024\" or year and month_num",
            )),
        }
    }

    /// Write the supplied figures over `aggregate`, which becomes a manual entry
    pub fn apply(self, aggregate: &mut MonthlyAggregate) -> CoreResult<()> {
        let savings = match self.savings {
            Some(savings) => savings,
            None => self
                .income
                .checked_sub(self.expenses)
                .ok_or_else(|| CoreError::validation("Savings out of range"))?,
        };
        aggregate.savings_rate = self
            .savings_rate
            .unwrap_or_else(|| savings_rate(self.income, savings));
        aggregate.income = self.income;
        aggregate.expenses = self.expenses;
        aggregate.savings = savings;
        if let Some(net_worth) = self.net_worth {
            aggregate.net_worth = net_worth;
        }
        if let Some(spending) = self.category_spending {
            aggregate.category_spending = spending;
        }
        aggregate.is_auto_generated = false;
        Ok(())
    }
}

impl MonthlyAggregate {
    /// Empty aggregate for a month
    pub fn empty(user_id: &str, key: MonthKey) -> Self {
        Self {
            id: generate_id(),
            user_id: user_id.to_string(),
            month: key.label(),
            year: key.year,
            month_num: key.month_num,
            income: Decimal::ZERO,
            expenses: Decimal::ZERO,
            savings: Decimal::ZERO,
            savings_rate: Decimal::ZERO,
            net_worth: Decimal::ZERO,
            category_spending: Vec::new(),
            is_auto_generated: false,
        }
    }
}
