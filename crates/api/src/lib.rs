//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes for auth, transactions and statistics
//! - Authentication middleware
//! - Request extractors that report bad input in the response envelope
//! - Response and error types

pub mod error;
pub mod extractors;
pub mod middleware;
pub mod response;
pub mod routes;

pub use error::ApiError;
pub use response::ApiResponse;

use std::sync::Arc;

use axum::Router;
use fintrack_core::transaction::TransactionService;
use fintrack_core::user::UserStore;
use fintrack_db::Storage;
use fintrack_shared::JwtService;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Transaction service.
    pub transactions: Arc<TransactionService>,
    /// Credential store.
    pub users: Arc<dyn UserStore>,
    /// JWT service for token operations.
    pub jwt_service: Arc<JwtService>,
    /// Name of the storage backend, reported by the health check.
    pub storage_backend: &'static str,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("storage_backend", &self.storage_backend)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Wires the services on top of `storage`.
    #[must_use]
    pub fn new(storage: &Storage, jwt_service: JwtService) -> Self {
        Self {
            transactions: Arc::new(TransactionService::new(storage.transactions())),
            users: storage.users(),
            jwt_service: Arc::new(jwt_service),
            storage_backend: storage.backend_name(),
        }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
