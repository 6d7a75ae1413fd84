//! Statistical rollups over a set of transactions.
//!
//! All functions are pure: the service fetches the owner-scoped rows and
//! these reduce them. Absent groups always come back as zero, never as
//! missing values.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use super::query::month_of;
use super::types::{Transaction, TransactionKind};

/// Running sum and count for one group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    /// Sum of amounts.
    pub total: Decimal,
    /// Number of transactions.
    pub count: u64,
}

impl Tally {
    fn add(&mut self, amount: Decimal) {
        self.total += amount;
        self.count += 1;
    }

    /// Mean amount rounded to cents, zero for an empty group.
    #[must_use]
    pub fn average(&self) -> Decimal {
        if self.count == 0 {
            return Decimal::ZERO;
        }
        (self.total / Decimal::from(self.count))
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }
}

/// Totals by type over a date range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeSummary {
    /// Sum of income.
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub total_income: Decimal,
    /// Sum of expenses.
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub total_expense: Decimal,
    /// Income minus expenses.
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub net_amount: Decimal,
    /// Number of income transactions.
    pub income_count: u64,
    /// Number of expense transactions.
    pub expense_count: u64,
    /// Number of transactions of either type.
    pub total_transactions: u64,
    /// Mean income amount.
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub average_income: Decimal,
    /// Mean expense amount.
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub average_expense: Decimal,
}

/// One `(category, type)` group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryStat {
    /// Category label.
    pub category: String,
    /// Income or expense.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// Sum of amounts.
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub total: Decimal,
    /// Number of transactions.
    pub count: u64,
    /// Mean amount.
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub average: Decimal,
}

/// One calendar month with both sides filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyStat {
    /// Calendar year.
    pub year: i32,
    /// Month, 1 through 12.
    pub month: u32,
    /// Sum of income.
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub income: Decimal,
    /// Sum of expenses.
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub expense: Decimal,
    /// Number of income transactions.
    pub income_count: u64,
    /// Number of expense transactions.
    pub expense_count: u64,
    /// Income minus expenses.
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub net: Decimal,
    /// Number of transactions of either type.
    pub total_transactions: u64,
}

#[derive(Debug, Default)]
struct Sides {
    income: Tally,
    expense: Tally,
}

impl Sides {
    fn add(&mut self, transaction: &Transaction) {
        match transaction.kind {
            TransactionKind::Income => self.income.add(transaction.amount),
            TransactionKind::Expense => self.expense.add(transaction.amount),
        }
    }
}

/// Totals, counts and averages per type.
#[must_use]
pub fn summarize(transactions: &[Transaction]) -> TypeSummary {
    let mut sides = Sides::default();
    for transaction in transactions {
        sides.add(transaction);
    }

    TypeSummary {
        total_income: sides.income.total,
        total_expense: sides.expense.total,
        net_amount: sides.income.total - sides.expense.total,
        income_count: sides.income.count,
        expense_count: sides.expense.count,
        total_transactions: sides.income.count + sides.expense.count,
        average_income: sides.income.average(),
        average_expense: sides.expense.average(),
    }
}

/// Groups by `(category, type)`, largest total first.
///
/// Ties are ordered by category, then type, so the output is deterministic.
#[must_use]
pub fn by_category(transactions: &[Transaction]) -> Vec<CategoryStat> {
    let mut groups: HashMap<(&str, TransactionKind), Tally> = HashMap::new();
    for transaction in transactions {
        groups
            .entry((transaction.category.as_str(), transaction.kind))
            .or_default()
            .add(transaction.amount);
    }

    let mut stats: Vec<CategoryStat> = groups
        .into_iter()
        .map(|((category, kind), tally)| CategoryStat {
            category: category.to_string(),
            kind,
            total: tally.total,
            count: tally.count,
            average: tally.average(),
        })
        .collect();

    stats.sort_by(|a, b| {
        b.total
            .cmp(&a.total)
            .then_with(|| a.category.cmp(&b.category))
            .then_with(|| a.kind.cmp(&b.kind))
    });
    stats
}

/// One row per `(year, month)` that has transactions, ascending.
#[must_use]
pub fn by_month(transactions: &[Transaction]) -> Vec<MonthlyStat> {
    let mut months: BTreeMap<(i32, u32), Sides> = BTreeMap::new();
    for transaction in transactions {
        months
            .entry(month_of(transaction.date))
            .or_default()
            .add(transaction);
    }

    months
        .into_iter()
        .map(|((year, month), sides)| MonthlyStat {
            year,
            month,
            income: sides.income.total,
            expense: sides.expense.total,
            income_count: sides.income.count,
            expense_count: sides.expense.count,
            net: sides.income.total - sides.expense.total,
            total_transactions: sides.income.count + sides.expense.count,
        })
        .collect()
}
