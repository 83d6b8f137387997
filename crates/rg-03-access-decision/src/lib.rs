//! # Access Decision Engine (rg-03)
//!
//! Decides whether the ramp opens for a recognized plate.
//!
//! ## Rule
//!
//! Granted iff the current whitelist snapshot holds an entry whose plate
//! matches and whose `[validFrom, validTo]` window contains today's local
//! calendar date (both ends inclusive). Granted requests publish
//! `{"eventType":"command-open-ramp","details":"open-ramp","value":1}` on
//! `alpr/ramp/cmd`; denied requests publish nothing.
//!
//! ## Error Handling
//!
//! | Condition | Decision | Logged at |
//! |-----------|----------|-----------|
//! | payload unreadable or plate missing | denied | warn |
//! | no covering entry | denied | info |
//! | covering entry, publish failed | granted | error |
//!
//! ## Hexagonal Architecture
//!
//! - **Domain Layer** (`domain/`): authorization rule, decision type
//! - **Ports Layer** (`ports/`): `WhitelistView`, `CommandPublisher`, `Clock`
//! - **Adapters Layer** (`adapters/`): local clock and test doubles
//! - **Handler** (`handler`): consumer for the access-request topic

pub mod adapters;
pub mod domain;
pub mod handler;
pub mod ports;
pub mod service;

pub use adapters::{FixedClock, LocalClock, RecordingPublisher, StaticWhitelist};
pub use domain::{find_authorized, is_authorized, AccessDecision, DenialReason};
pub use handler::AccessRequestHandler;
pub use ports::{Clock, CommandPublisher, WhitelistView};
pub use service::{AccessDecisionEngine, Evaluation};
