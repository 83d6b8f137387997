//! Ports for the Whitelist Cache.

pub mod inbound;
pub mod outbound;

pub use inbound::WhitelistCacheApi;
pub use outbound::WhitelistStore;
