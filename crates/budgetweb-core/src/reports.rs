//! Report structures for API responses

use budgetweb_parser::Category;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::CoreResult;
use crate::models::{add_amount, Goal, MonthlyAggregate, Transaction};

/// Filters and paging for the transaction list
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionQuery {
    /// 1-based; 0 or absent means the first page
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub category: Option<Category>,
}

impl TransactionQuery {
    pub fn matches(&self, tx: &Transaction) -> bool {
        self.start_date.map_or(true, |start| tx.date >= start)
            && self.end_date.map_or(true, |end| tx.date <= end)
            && self.category.map_or(true, |category| tx.category == category)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRef {
    pub page: usize,
    pub limit: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<PageRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<PageRef>,
}

/// One page of transactions, newest first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionPage {
    pub transactions: Vec<Transaction>,
    pub pagination: Pagination,
    /// Matching transactions across all pages
    pub total: usize,
}

/// Sort newest first and cut out one page
///
/// Transactions on the same day keep their stored order.
pub fn paginate(mut transactions: Vec<Transaction>, page: usize, limit: usize) -> TransactionPage {
    let page = page.max(1);
    let limit = limit.max(1);
    transactions.sort_by(|a, b| b.date.cmp(&a.date));

    let total = transactions.len();
    let start = (page - 1).saturating_mul(limit);
    let end = page.saturating_mul(limit);

    let mut pagination = Pagination::default();
    if end < total {
        pagination.next = Some(PageRef { page: page + 1, limit });
    }
    if start > 0 {
        pagination.prev = Some(PageRef { page: page - 1, limit });
    }

    let transactions = transactions.into_iter().skip(start).take(limit).collect();
    TransactionPage {
        transactions,
        pagination,
        total,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: Category,
    pub amount: Decimal,
}

/// All-time financial overview
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialStats {
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    /// From the most recent monthly aggregate
    pub savings_rate: Decimal,
    /// From the most recent monthly aggregate
    pub net_worth: Decimal,
    /// Expense totals per category, largest first
    pub category_spending: Vec<CategoryTotal>,
    /// Goals still in progress
    pub active_goals: usize,
}

impl FinancialStats {
    pub fn compute(
        transactions: &[Transaction],
        latest: Option<&MonthlyAggregate>,
        goals: &[Goal],
    ) -> CoreResult<Self> {
        let mut total_income = Decimal::ZERO;
        let mut total_expenses = Decimal::ZERO;
        let mut by_category: HashMap<Category, Decimal> = HashMap::new();

        for tx in transactions {
            if tx.is_income() {
                total_income = add_amount(total_income, tx.amount, "Total income")?;
            } else if tx.is_expense() {
                let spent = tx.amount.abs();
                total_expenses = add_amount(total_expenses, spent, "Total expenses")?;
                let category_total = by_category.entry(tx.category).or_default();
                *category_total = add_amount(*category_total, spent, "Category spending")?;
            }
        }

        let mut category_spending: Vec<CategoryTotal> = by_category
            .into_iter()
            .map(|(category, amount)| CategoryTotal { category, amount })
            .collect();
        category_spending.sort_by(|a, b| {
            b.amount
                .cmp(&a.amount)
                .then_with(|| a.category.cmp(&b.category))
        });

        Ok(Self {
            total_income,
            total_expenses,
            savings_rate: latest.map(|m| m.savings_rate).unwrap_or_default(),
            net_worth: latest.map(|m| m.net_worth).unwrap_or_default(),
            category_spending,
            active_goals: goals.iter().filter(|g| g.is_active()).count(),
        })
    }
}
