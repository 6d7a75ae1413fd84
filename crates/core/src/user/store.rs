//! Storage contract for users.

use async_trait::async_trait;
use fintrack_shared::types::UserId;

use super::types::User;
use crate::transaction::StoreError;

/// Persistence operations for users.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persists a new user.
    ///
    /// Returns `StoreError::Conflict` if the email is already taken.
    async fn insert(&self, user: User) -> Result<User, StoreError>;

    /// Finds a user by normalized email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Finds a user by id.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;
}
