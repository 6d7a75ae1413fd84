//! User domain types.

use chrono::{DateTime, Utc};
use fintrack_shared::auth::UserInfo;
use fintrack_shared::types::UserId;

use crate::auth::Registration;

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// User ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Lower-cased email, unique across users.
    pub email: String,
    /// Argon2id PHC string.
    pub password_hash: String,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Builds a new user from a validated registration and its password hash.
    #[must_use]
    pub fn new(registration: Registration, password_hash: String, now: DateTime<Utc>) -> Self {
        Self {
            id: UserId::new(),
            name: registration.name,
            email: registration.email,
            password_hash,
            created_at: now,
            updated_at: now,
        }
    }

    /// Public profile, without the password hash.
    #[must_use]
    pub fn info(&self) -> UserInfo {
        UserInfo {
            id: self.id.into_inner(),
            name: self.name.clone(),
            email: self.email.clone(),
            created_at: self.created_at,
        }
    }
}
