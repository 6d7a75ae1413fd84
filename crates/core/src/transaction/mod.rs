//! Personal-finance transactions.
//!
//! This module implements the transaction query and aggregation engine:
//! - Domain types and raw input (drafts and sparse patches)
//! - Validation of drafts and merged updates
//! - Query parsing into owner-scoped filters, sorts and pages
//! - The storage contract and its in-memory implementation
//! - Rollups by type, by category and by month
//! - The service tying them together

pub mod error;
pub mod memory;
pub mod query;
pub mod service;
pub mod stats;
pub mod store;
pub mod types;
pub mod validation;

#[cfg(test)]
mod stats_props;

pub use error::TransactionError;
pub use memory::InMemoryTransactionStore;
pub use query::{
    DateRange, ListParams, ListQuery, Sort, SortField, SortOrder, StatsParams, TransactionFilter,
};
pub use service::{TransactionPage, TransactionService};
pub use stats::{CategoryStat, MonthlyStat, TypeSummary};
pub use store::{StoreError, TransactionStore};
pub use types::{
    Frequency, PaymentMethod, Recurrence, Transaction, TransactionDraft, TransactionFields,
    TransactionKind, TransactionPatch,
};
pub use validation::validate_draft;
