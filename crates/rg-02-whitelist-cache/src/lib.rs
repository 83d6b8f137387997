//! # Whitelist Cache (rg-02)
//!
//! The authoritative fast-path copy of the plate whitelist.
//!
//! ## Lifecycle
//!
//! ```text
//! startup ──→ empty v0 ──reload()──→ v1 ──refresh event──→ v2 ──→ ...
//!                                      │
//!                                      └─ failed reload: version unchanged
//! ```
//!
//! The cache is never patched. Every reload fetches all active rows from
//! the store, builds a new `WhitelistSnapshot` and swaps the handle.
//! Readers that already hold a snapshot keep using it.
//!
//! ## Hexagonal Architecture
//!
//! - **Domain Layer** (`domain/`): snapshot construction, row policy
//! - **Ports Layer** (`ports/`): `WhitelistCacheApi` in, `WhitelistStore` out
//! - **Adapters Layer** (`adapters/`): SQLite and in-memory stores
//! - **Handler** (`handler`): reload on the whitelist-refresh topic

pub mod adapters;
pub mod domain;
pub mod handler;
pub mod ports;
pub mod service;

pub use adapters::{InMemoryWhitelistStore, SqliteWhitelistStore};
pub use domain::{CacheError, ReloadReport, SkippedRow};
pub use handler::WhitelistRefreshHandler;
pub use ports::{WhitelistCacheApi, WhitelistStore};
pub use service::WhitelistCache;
