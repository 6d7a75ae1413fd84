//! Postgres user store.

use async_trait::async_trait;
use chrono::Utc;
use fintrack_core::transaction::StoreError;
use fintrack_core::user::{User, UserStore};
use fintrack_shared::types::UserId;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
    SqlErr,
};

use super::transaction::backend;
use crate::entities::users;

/// User store backed by the `users` table.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn insert_error(err: DbErr, email: &str) -> StoreError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            StoreError::Conflict(format!("email {email} is already registered"))
        }
        _ => backend(err),
    }
}

fn from_model(model: users::Model) -> User {
    User {
        id: UserId::from_uuid(model.id),
        name: model.name,
        email: model.email,
        password_hash: model.password_hash,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn insert(&self, user: User) -> Result<User, StoreError> {
        let active = users::ActiveModel {
            id: Set(user.id.into_inner()),
            name: Set(user.name.clone()),
            email: Set(user.email.clone()),
            password_hash: Set(user.password_hash.clone()),
            created_at: Set(user.created_at.into()),
            updated_at: Set(user.updated_at.into()),
        };

        active
            .insert(&self.db)
            .await
            .map(from_model)
            .map_err(|e| insert_error(e, &user.email))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map(|found| found.map(from_model))
            .map_err(backend)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        users::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map(|found| found.map(from_model))
            .map_err(backend)
    }
}
