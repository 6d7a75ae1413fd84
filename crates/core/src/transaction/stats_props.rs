//! Property-based tests for the rollups, filters and pagination.
//!
//! - Net amounts equal income minus expense, overall and per month
//! - Category groups cover every distinct pair and are non-increasing
//! - Filters and pages only ever return the owner's rows

use std::collections::HashSet;

use chrono::{Duration, NaiveDate, Utc};
use fintrack_shared::types::{PageMeta, PageRequest, UserId};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::memory::InMemoryTransactionStore;
use super::query::{Sort, TransactionFilter};
use super::stats::{by_category, by_month, summarize};
use super::store::TransactionStore;
use super::types::{Transaction, TransactionFields, TransactionKind};

/// Strategy to generate positive amounts (0.01 to 10,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn kind_strategy() -> impl Strategy<Value = TransactionKind> {
    prop_oneof![Just(TransactionKind::Income), Just(TransactionKind::Expense)]
}

fn category_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Food".to_string()),
        Just("Rent".to_string()),
        Just("Salary".to_string()),
        Just("Travel".to_string()),
    ]
}

/// Days since 2023-01-01, spanning two calendar years.
fn day_offset() -> impl Strategy<Value = i64> {
    0i64..730
}

fn make_tx(
    owner: UserId,
    offset: i64,
    kind: TransactionKind,
    category: String,
    amount: Decimal,
) -> Transaction {
    let base = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default();
    Transaction::new(
        owner,
        TransactionFields {
            date: base + Duration::days(offset),
            description: format!("{category} on day {offset}"),
            amount,
            category,
            kind,
            tags: vec![],
            notes: None,
            payment_method: None,
            recurrence: None,
        },
        Utc::now(),
    )
}

fn rows_strategy() -> impl Strategy<Value = Vec<Transaction>> {
    let owner = UserId::new();
    prop::collection::vec(
        (day_offset(), kind_strategy(), category_strategy(), positive_amount()),
        0..40,
    )
    .prop_map(move |specs| {
        specs
            .into_iter()
            .map(|(offset, kind, category, amount)| make_tx(owner, offset, kind, category, amount))
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_summary_net_is_income_minus_expense(rows in rows_strategy()) {
        let summary = summarize(&rows);

        prop_assert_eq!(summary.net_amount, summary.total_income - summary.total_expense);
        prop_assert_eq!(summary.total_transactions, rows.len() as u64);
        prop_assert_eq!(summary.income_count + summary.expense_count, summary.total_transactions);
        if summary.income_count == 0 {
            prop_assert_eq!(summary.total_income, Decimal::ZERO);
            prop_assert_eq!(summary.average_income, Decimal::ZERO);
        }
    }

    #[test]
    fn prop_category_groups_cover_distinct_pairs(rows in rows_strategy()) {
        let stats = by_category(&rows);
        let pairs: HashSet<(&str, TransactionKind)> =
            rows.iter().map(|t| (t.category.as_str(), t.kind)).collect();

        prop_assert_eq!(stats.len(), pairs.len());
        for window in stats.windows(2) {
            prop_assert!(window[0].total >= window[1].total);
        }
        let counted: u64 = stats.iter().map(|s| s.count).sum();
        prop_assert_eq!(counted, rows.len() as u64);
    }

    #[test]
    fn prop_monthly_rows_are_ordered_and_balanced(rows in rows_strategy()) {
        let months = by_month(&rows);

        for window in months.windows(2) {
            prop_assert!((window[0].year, window[0].month) < (window[1].year, window[1].month));
        }
        for month in &months {
            prop_assert_eq!(month.net, month.income - month.expense);
            prop_assert_eq!(month.total_transactions, month.income_count + month.expense_count);
            prop_assert!(month.total_transactions > 0);
        }
        let total: u64 = months.iter().map(|m| m.total_transactions).sum();
        prop_assert_eq!(total, rows.len() as u64);
    }

    #[test]
    fn prop_page_meta_is_consistent(total in 0u64..5_000, page in 1u64..200, limit in 1u64..=100) {
        let meta = PageMeta::new(PageRequest::new(page, limit), total);

        prop_assert_eq!(meta.total_pages, total.div_ceil(limit));
        prop_assert_eq!(meta.has_next_page, page < meta.total_pages);
        prop_assert_eq!(meta.has_prev_page, page > 1);
    }

    #[test]
    fn prop_pages_only_contain_owner_rows(
        mine in rows_strategy(),
        theirs in rows_strategy(),
        page in 1u64..5,
        limit in 1u64..=20,
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        let store = InMemoryTransactionStore::new();
        let owner = mine.first().map_or_else(UserId::new, |t| t.user_id);

        let fetched = runtime.block_on(async {
            for row in mine.iter().chain(theirs.iter()) {
                store.insert(row.clone()).await?;
            }
            let filter = TransactionFilter::for_owner(owner);
            let rows = store.page(&filter, Sort::default(), PageRequest::new(page, limit)).await?;
            let total = store.count(&filter).await?;
            Ok::<_, super::store::StoreError>((rows, total))
        });
        let (rows, total) = fetched.map_err(|e| TestCaseError::fail(e.to_string()))?;

        prop_assert_eq!(total, mine.len() as u64);
        prop_assert!(rows.len() as u64 <= limit);
        prop_assert!(rows.iter().all(|t| t.user_id == owner));
    }
}
