//! In-memory transaction store.

use async_trait::async_trait;
use dashmap::DashMap;
use fintrack_shared::types::{PageRequest, TransactionId, UserId};

use super::query::{Sort, TransactionFilter};
use super::store::{StoreError, TransactionStore};
use super::types::Transaction;

/// `DashMap`-backed store with the same query contract as the database
/// repository.
#[derive(Debug, Default)]
pub struct InMemoryTransactionStore {
    rows: DashMap<TransactionId, Transaction>,
}

impl InMemoryTransactionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored transactions across all owners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn matching(&self, filter: &TransactionFilter) -> Vec<Transaction> {
        self.rows
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect()
    }
}

#[async_trait]
impl TransactionStore for InMemoryTransactionStore {
    async fn insert(&self, transaction: Transaction) -> Result<Transaction, StoreError> {
        if self.rows.contains_key(&transaction.id) {
            return Err(StoreError::Conflict(format!(
                "transaction {} already exists",
                transaction.id
            )));
        }
        self.rows.insert(transaction.id, transaction.clone());
        Ok(transaction)
    }

    async fn find(
        &self,
        owner: UserId,
        id: TransactionId,
    ) -> Result<Option<Transaction>, StoreError> {
        Ok(self
            .rows
            .get(&id)
            .filter(|entry| entry.user_id == owner)
            .map(|entry| entry.value().clone()))
    }

    async fn replace(&self, transaction: Transaction) -> Result<Option<Transaction>, StoreError> {
        let Some(mut entry) = self.rows.get_mut(&transaction.id) else {
            return Ok(None);
        };
        if entry.user_id != transaction.user_id {
            return Ok(None);
        }
        *entry = transaction.clone();
        Ok(Some(transaction))
    }

    async fn remove(
        &self,
        owner: UserId,
        id: TransactionId,
    ) -> Result<Option<Transaction>, StoreError> {
        Ok(self
            .rows
            .remove_if(&id, |_, transaction| transaction.user_id == owner)
            .map(|(_, transaction)| transaction))
    }

    async fn page(
        &self,
        filter: &TransactionFilter,
        sort: Sort,
        page: PageRequest,
    ) -> Result<Vec<Transaction>, StoreError> {
        let mut rows = self.matching(filter);
        rows.sort_by(|a, b| sort.compare(a, b));

        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(page.limit()).unwrap_or(usize::MAX);
        Ok(rows.into_iter().skip(offset).take(limit).collect())
    }

    async fn count(&self, filter: &TransactionFilter) -> Result<u64, StoreError> {
        let count = self
            .rows
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .count();
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }

    async fn scan(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>, StoreError> {
        Ok(self.matching(filter))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
