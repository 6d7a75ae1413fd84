//! Registered users and their credential store.

pub mod memory;
pub mod store;
pub mod types;

pub use memory::InMemoryUserStore;
pub use store::UserStore;
pub use types::User;
