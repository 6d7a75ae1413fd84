//! Storage contract for transactions.
//!
//! Every lookup and mutation takes the owner so that a record belonging to
//! another user is indistinguishable from a missing one.

use async_trait::async_trait;
use fintrack_shared::AppError;
use fintrack_shared::types::{PageRequest, TransactionId, UserId};
use thiserror::Error;

use super::query::{Sort, TransactionFilter};
use super::types::Transaction;

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend failed (connection, query, serialization).
    #[error("storage backend error: {0}")]
    Backend(String),

    /// A uniqueness constraint was violated.
    #[error("conflict: {0}")]
    Conflict(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Backend(msg) => Self::Database(msg),
            StoreError::Conflict(msg) => Self::Conflict(msg),
        }
    }
}

/// Persistence operations for transactions.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Persists a new transaction.
    async fn insert(&self, transaction: Transaction) -> Result<Transaction, StoreError>;

    /// Finds a transaction by id, scoped to `owner`.
    async fn find(
        &self,
        owner: UserId,
        id: TransactionId,
    ) -> Result<Option<Transaction>, StoreError>;

    /// Overwrites a transaction when both id and owner match.
    ///
    /// Returns `None` if no such record exists.
    async fn replace(&self, transaction: Transaction) -> Result<Option<Transaction>, StoreError>;

    /// Deletes a transaction scoped to `owner`, returning its prior state.
    async fn remove(
        &self,
        owner: UserId,
        id: TransactionId,
    ) -> Result<Option<Transaction>, StoreError>;

    /// Returns one sorted page of matching transactions.
    async fn page(
        &self,
        filter: &TransactionFilter,
        sort: Sort,
        page: PageRequest,
    ) -> Result<Vec<Transaction>, StoreError>;

    /// Counts matching transactions.
    async fn count(&self, filter: &TransactionFilter) -> Result<u64, StoreError>;

    /// Returns every matching transaction, unordered.
    async fn scan(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>, StoreError>;

    /// Checks that the backend is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}
