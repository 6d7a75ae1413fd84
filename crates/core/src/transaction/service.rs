//! Transaction service: owner-scoped CRUD, listing and statistics.

use std::sync::Arc;

use chrono::Utc;
use fintrack_shared::types::{PageMeta, TransactionId, UserId};
use tracing::{debug, info};

use super::error::TransactionError;
use super::query::{DateRange, ListQuery, TransactionFilter};
use super::stats::{self, CategoryStat, MonthlyStat, TypeSummary};
use super::store::TransactionStore;
use super::types::{Transaction, TransactionDraft, TransactionKind, TransactionPatch};
use super::validation::validate_draft;

/// One page of transactions plus its metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionPage {
    /// Transactions on this page.
    pub transactions: Vec<Transaction>,
    /// Pagination metadata.
    pub pagination: PageMeta,
}

/// Service over an injected [`TransactionStore`].
#[derive(Clone)]
pub struct TransactionService {
    store: Arc<dyn TransactionStore>,
}

impl std::fmt::Debug for TransactionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionService").finish_non_exhaustive()
    }
}

impl TransactionService {
    /// Creates a service backed by `store`.
    #[must_use]
    pub fn new(store: Arc<dyn TransactionStore>) -> Self {
        Self { store }
    }

    /// Lists one page of the owner's transactions.
    ///
    /// # Errors
    ///
    /// Returns `TransactionError::Storage` if the store fails.
    pub async fn list(&self, query: ListQuery) -> Result<TransactionPage, TransactionError> {
        let total = self.store.count(&query.filter).await?;
        let transactions = if query.page.offset() >= total {
            Vec::new()
        } else {
            self.store
                .page(&query.filter, query.sort, query.page)
                .await?
        };

        debug!(
            owner = %query.filter.owner,
            total,
            returned = transactions.len(),
            "listed transactions"
        );

        Ok(TransactionPage {
            transactions,
            pagination: PageMeta::new(query.page, total),
        })
    }

    /// Fetches one transaction.
    ///
    /// # Errors
    ///
    /// Returns `TransactionError::NotFound` if it does not exist or belongs to
    /// someone else.
    pub async fn get(
        &self,
        owner: UserId,
        id: TransactionId,
    ) -> Result<Transaction, TransactionError> {
        self.store
            .find(owner, id)
            .await?
            .ok_or(TransactionError::NotFound)
    }

    /// Validates and stores a new transaction for `owner`.
    ///
    /// # Errors
    ///
    /// Returns `TransactionError::Validation` with every invalid field.
    pub async fn create(
        &self,
        owner: UserId,
        draft: &TransactionDraft,
    ) -> Result<Transaction, TransactionError> {
        let fields = validate_draft(draft)?;
        let transaction = self
            .store
            .insert(Transaction::new(owner, fields, Utc::now()))
            .await?;

        info!(
            owner = %owner,
            transaction_id = %transaction.id,
            kind = %transaction.kind,
            "transaction created"
        );
        Ok(transaction)
    }

    /// Applies a sparse update. The merged record is validated as a whole.
    ///
    /// # Errors
    ///
    /// Returns `TransactionError::NotFound` for foreign or missing records
    /// and `TransactionError::Validation` if the merged record is invalid.
    pub async fn update(
        &self,
        owner: UserId,
        id: TransactionId,
        patch: TransactionPatch,
    ) -> Result<Transaction, TransactionError> {
        let current = self.get(owner, id).await?;
        let merged = patch.apply_to(TransactionDraft::from(&current));
        let fields = validate_draft(&merged)?;

        let updated = self
            .store
            .replace(current.with_fields(fields, Utc::now()))
            .await?
            .ok_or(TransactionError::NotFound)?;

        info!(owner = %owner, transaction_id = %id, "transaction updated");
        Ok(updated)
    }

    /// Deletes a transaction, returning its prior state.
    ///
    /// # Errors
    ///
    /// Returns `TransactionError::NotFound` for foreign or missing records.
    pub async fn delete(
        &self,
        owner: UserId,
        id: TransactionId,
    ) -> Result<Transaction, TransactionError> {
        let removed = self
            .store
            .remove(owner, id)
            .await?
            .ok_or(TransactionError::NotFound)?;

        info!(owner = %owner, transaction_id = %id, "transaction deleted");
        Ok(removed)
    }

    /// Totals by type within `range`.
    ///
    /// # Errors
    ///
    /// Returns `TransactionError::Storage` if the store fails.
    pub async fn summary(
        &self,
        owner: UserId,
        range: DateRange,
    ) -> Result<TypeSummary, TransactionError> {
        let filter = TransactionFilter::for_owner(owner).with_range(range);
        let rows = self.store.scan(&filter).await?;
        Ok(stats::summarize(&rows))
    }

    /// Totals by `(category, type)` within `range`, optionally one type only.
    ///
    /// # Errors
    ///
    /// Returns `TransactionError::Storage` if the store fails.
    pub async fn category_stats(
        &self,
        owner: UserId,
        range: DateRange,
        kind: Option<TransactionKind>,
    ) -> Result<Vec<CategoryStat>, TransactionError> {
        let filter = TransactionFilter::for_owner(owner)
            .with_range(range)
            .with_kind(kind);
        let rows = self.store.scan(&filter).await?;
        Ok(stats::by_category(&rows))
    }

    /// Month-by-month totals, optionally restricted to one calendar year.
    ///
    /// # Errors
    ///
    /// Returns `TransactionError::Validation` for a year outside the
    /// calendar and `TransactionError::Storage` if the store fails.
    pub async fn monthly_stats(
        &self,
        owner: UserId,
        year: Option<i32>,
    ) -> Result<Vec<MonthlyStat>, TransactionError> {
        let range = match year {
            None => DateRange::all(),
            Some(year) => DateRange::year(year).ok_or_else(|| {
                let mut errors = fintrack_shared::ValidationErrors::new();
                errors.push("year", "Year is out of range");
                TransactionError::Validation(errors)
            })?,
        };
        let filter = TransactionFilter::for_owner(owner).with_range(range);
        let rows = self.store.scan(&filter).await?;
        Ok(stats::by_month(&rows))
    }

    /// Checks that the store is reachable.
    ///
    /// # Errors
    ///
    /// Returns `TransactionError::Storage` if it is not.
    pub async fn ping(&self) -> Result<(), TransactionError> {
        self.store.ping().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::memory::InMemoryTransactionStore;
    use crate::transaction::query::{ListParams, Sort};
    use chrono::NaiveDate;
    use fintrack_shared::types::PageRequest;
    use rust_decimal_macros::dec;

    fn service() -> TransactionService {
        TransactionService::new(Arc::new(InMemoryTransactionStore::new()))
    }

    fn draft(
        date: &str,
        kind: &str,
        category: &str,
        amount: rust_decimal::Decimal,
    ) -> TransactionDraft {
        TransactionDraft {
            date: Some(date.to_string()),
            description: Some(format!("{category} {date}")),
            amount: Some(amount),
            category: Some(category.to_string()),
            kind: Some(kind.to_string()),
            ..TransactionDraft::default()
        }
    }

    fn january() -> DateRange {
        DateRange {
            from: NaiveDate::from_ymd_opt(2024, 1, 1),
            to: NaiveDate::from_ymd_opt(2024, 1, 31),
        }
    }

    #[tokio::test]
    async fn test_summary_scenario() {
        let service = service();
        let owner = UserId::new();
        service
            .create(owner, &draft("2024-01-05", "income", "Salary", dec!(100)))
            .await
            .unwrap();
        service
            .create(owner, &draft("2024-01-10", "expense", "Food", dec!(40)))
            .await
            .unwrap();
        service
            .create(owner, &draft("2024-02-10", "expense", "Food", dec!(7)))
            .await
            .unwrap();
        service
            .create(UserId::new(), &draft("2024-01-10", "income", "Salary", dec!(999)))
            .await
            .unwrap();

        let summary = service.summary(owner, january()).await.unwrap();
        assert_eq!(summary.total_income, dec!(100));
        assert_eq!(summary.total_expense, dec!(40));
        assert_eq!(summary.net_amount, dec!(60));
        assert_eq!(summary.total_transactions, 2);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_draft() {
        let result = service()
            .create(UserId::new(), &TransactionDraft::default())
            .await;
        assert!(matches!(result, Err(TransactionError::Validation(e)) if e.has_field("amount")));
    }

    #[tokio::test]
    async fn test_foreign_records_are_not_found() {
        let service = service();
        let owner = UserId::new();
        let intruder = UserId::new();
        let tx = service
            .create(owner, &draft("2024-01-05", "income", "Salary", dec!(100)))
            .await
            .unwrap();

        assert!(matches!(
            service.get(intruder, tx.id).await,
            Err(TransactionError::NotFound)
        ));
        let patch = TransactionPatch {
            amount: Some(dec!(1)),
            ..TransactionPatch::default()
        };
        assert!(matches!(
            service.update(intruder, tx.id, patch).await,
            Err(TransactionError::NotFound)
        ));
        assert!(matches!(
            service.delete(intruder, tx.id).await,
            Err(TransactionError::NotFound)
        ));
        assert_eq!(service.get(owner, tx.id).await.unwrap().amount, dec!(100));
    }

    #[tokio::test]
    async fn test_update_merges_and_revalidates() {
        let service = service();
        let owner = UserId::new();
        let tx = service
            .create(owner, &draft("2024-01-05", "expense", "Food", dec!(12.50)))
            .await
            .unwrap();

        let patch = TransactionPatch {
            category: Some("Dining".to_string()),
            notes: Some(Some("with friends".to_string())),
            ..TransactionPatch::default()
        };
        let updated = service.update(owner, tx.id, patch).await.unwrap();
        assert_eq!(updated.category, "Dining");
        assert_eq!(updated.amount, dec!(12.50));
        assert_eq!(updated.notes.as_deref(), Some("with friends"));
        assert_eq!(updated.created_at, tx.created_at);

        let bad = TransactionPatch {
            is_recurring: Some(true),
            ..TransactionPatch::default()
        };
        let err = service.update(owner, tx.id, bad).await.unwrap_err();
        assert!(matches!(
            err,
            TransactionError::Validation(e) if e.has_field("recurringFrequency")
        ));

        let clear = TransactionPatch {
            notes: Some(None),
            ..TransactionPatch::default()
        };
        let cleared = service.update(owner, tx.id, clear).await.unwrap();
        assert!(cleared.notes.is_none());
    }

    #[tokio::test]
    async fn test_delete_returns_prior_state() {
        let service = service();
        let owner = UserId::new();
        let tx = service
            .create(owner, &draft("2024-01-05", "expense", "Food", dec!(3)))
            .await
            .unwrap();

        let removed = service.delete(owner, tx.id).await.unwrap();
        assert_eq!(removed, tx);
        assert!(matches!(
            service.get(owner, tx.id).await,
            Err(TransactionError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_list_paginates() {
        let service = service();
        let owner = UserId::new();
        for day in 1..=25 {
            service
                .create(owner, &draft(&format!("2024-01-{day:02}"), "expense", "Food", dec!(1)))
                .await
                .unwrap();
        }

        let query = ListParams {
            page: Some("3".to_string()),
            ..ListParams::default()
        }
        .into_query(owner)
        .unwrap();
        let page = service.list(query).await.unwrap();

        assert_eq!(page.transactions.len(), 5);
        assert_eq!(page.pagination.total_pages, 3);
        assert_eq!(page.pagination.total_transactions, 25);
        assert!(!page.pagination.has_next_page);
        assert!(page.pagination.has_prev_page);
        assert_eq!(
            page.transactions[0].date,
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()
        );
    }

    #[tokio::test]
    async fn test_list_past_the_end_skips_the_store() {
        let service = service();
        let owner = UserId::new();
        service
            .create(owner, &draft("2024-01-05", "expense", "Food", dec!(3)))
            .await
            .unwrap();

        let query = ListQuery {
            filter: TransactionFilter::for_owner(owner),
            sort: Sort::default(),
            page: PageRequest::new(u64::MAX, 10),
        };
        let page = service.list(query).await.unwrap();

        assert!(page.transactions.is_empty());
        assert_eq!(page.pagination.total_transactions, 1);
        assert!(!page.pagination.has_next_page);
    }

    #[tokio::test]
    async fn test_category_stats_filters_kind() {
        let service = service();
        let owner = UserId::new();
        service
            .create(owner, &draft("2024-01-05", "income", "Salary", dec!(100)))
            .await
            .unwrap();
        service
            .create(owner, &draft("2024-01-10", "expense", "Food", dec!(40)))
            .await
            .unwrap();

        let stats = service
            .category_stats(owner, DateRange::all(), Some(TransactionKind::Expense))
            .await
            .unwrap();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].category, "Food");
    }

    #[tokio::test]
    async fn test_monthly_stats_for_empty_year() {
        let service = service();
        let owner = UserId::new();
        service
            .create(owner, &draft("2024-01-05", "income", "Salary", dec!(100)))
            .await
            .unwrap();

        assert!(service.monthly_stats(owner, Some(2019)).await.unwrap().is_empty());
        assert_eq!(service.monthly_stats(owner, Some(2024)).await.unwrap().len(), 1);
        assert_eq!(service.monthly_stats(owner, None).await.unwrap().len(), 1);
    }
}
