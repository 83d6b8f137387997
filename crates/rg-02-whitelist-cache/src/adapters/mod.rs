//! # Adapters
//!
//! - `SqliteWhitelistStore`: the deployed whitelist database
//! - `InMemoryWhitelistStore`: rows held in memory, with a failure switch

pub mod memory;
pub mod sqlite;

pub use memory::InMemoryWhitelistStore;
pub use sqlite::SqliteWhitelistStore;
