//! # Domain Layer
//!
//! Pure authorization logic. No I/O, no clock.

pub mod authorization;
pub mod decision;

pub use authorization::{find_authorized, is_authorized};
pub use decision::{AccessDecision, DenialReason};
