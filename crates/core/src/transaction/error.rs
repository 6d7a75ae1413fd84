//! Transaction service errors.

use fintrack_shared::{AppError, ValidationErrors};
use thiserror::Error;

use super::store::StoreError;

/// Errors that can occur during transaction operations.
#[derive(Debug, Error)]
pub enum TransactionError {
    /// Input failed validation.
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// No transaction with that id belongs to the caller.
    #[error("Transaction not found")]
    NotFound,

    /// The store failed.
    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl From<ValidationErrors> for TransactionError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<TransactionError> for AppError {
    fn from(err: TransactionError) -> Self {
        match err {
            TransactionError::Validation(errors) => Self::validation(errors),
            TransactionError::NotFound => Self::NotFound("Transaction not found".to_string()),
            TransactionError::Storage(err) => err.into(),
        }
    }
}
