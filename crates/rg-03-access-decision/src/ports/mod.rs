//! Ports for the Access Decision Engine.

pub mod outbound;

pub use outbound::{Clock, CommandPublisher, WhitelistView};
