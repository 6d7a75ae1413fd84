//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Postgres implementations of the core store traits
//! - Database migrations
//! - [`Storage`], the explicitly constructed handle the server owns

pub mod entities;
pub mod migration;
pub mod repositories;

pub use repositories::{TransactionRepository, UserRepository};

use std::sync::Arc;
use std::time::Duration;

use fintrack_core::transaction::{InMemoryTransactionStore, TransactionStore};
use fintrack_core::user::{InMemoryUserStore, UserStore};
use fintrack_shared::config::{DatabaseConfig, StorageBackend};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use tracing::info;

/// Establishes a pooled connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    Database::connect(options).await
}

/// Storage client handle: the stores plus the connection they share.
///
/// Built once at startup, handed to the services and closed on shutdown.
#[derive(Clone)]
pub struct Storage {
    transactions: Arc<dyn TransactionStore>,
    users: Arc<dyn UserStore>,
    connection: Option<DatabaseConnection>,
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage")
            .field("backend", &self.backend_name())
            .finish_non_exhaustive()
    }
}

impl Storage {
    /// Builds the backend selected in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the Postgres connection cannot be established.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DbErr> {
        match config.backend {
            StorageBackend::Postgres => {
                let db = connect(config).await?;
                info!(
                    max_connections = config.max_connections,
                    "Connected to database"
                );
                Ok(Self::from_connection(db))
            }
            StorageBackend::Memory => {
                info!("Using in-memory storage; data is lost on restart");
                Ok(Self::in_memory())
            }
        }
    }

    /// Postgres-backed stores sharing `db`.
    #[must_use]
    pub fn from_connection(db: DatabaseConnection) -> Self {
        Self {
            transactions: Arc::new(TransactionRepository::new(db.clone())),
            users: Arc::new(UserRepository::new(db.clone())),
            connection: Some(db),
        }
    }

    /// Process-local stores with no external dependency.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            transactions: Arc::new(InMemoryTransactionStore::new()),
            users: Arc::new(InMemoryUserStore::new()),
            connection: None,
        }
    }

    /// Transaction store.
    #[must_use]
    pub fn transactions(&self) -> Arc<dyn TransactionStore> {
        Arc::clone(&self.transactions)
    }

    /// User store.
    #[must_use]
    pub fn users(&self) -> Arc<dyn UserStore> {
        Arc::clone(&self.users)
    }

    /// `"postgres"` or `"memory"`.
    #[must_use]
    pub const fn backend_name(&self) -> &'static str {
        if self.connection.is_some() {
            "postgres"
        } else {
            "memory"
        }
    }

    /// Closes the connection pool, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool fails to close cleanly.
    pub async fn close(self) -> Result<(), DbErr> {
        match self.connection {
            Some(db) => {
                db.close().await?;
                info!("Database connection closed");
                Ok(())
            }
            None => Ok(()),
        }
    }
}
