//! Core business logic for Fintrack.
//!
//! This crate contains pure domain logic with no web or database
//! dependencies. Storage is reached through the traits in
//! [`transaction::store`] and [`user::store`].
//!
//! # Modules
//!
//! - `transaction` - Transaction model, validation, querying and statistics
//! - `user` - Registered users and their store
//! - `auth` - Registration rules and password hashing

pub mod auth;
pub mod transaction;
pub mod user;
