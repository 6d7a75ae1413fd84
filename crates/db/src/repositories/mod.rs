//! Repository abstractions for data access.
//!
//! Repositories implement the store traits from `fintrack-core`, hiding the
//! `SeaORM` implementation details from the rest of the application.

pub mod transaction;
pub mod user;

pub use transaction::{TransactionRepository, escape_like};
pub use user::UserRepository;
