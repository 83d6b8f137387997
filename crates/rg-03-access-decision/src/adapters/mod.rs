//! # Adapters
//!
//! - `LocalClock`: the host's local calendar date
//! - `FixedClock`, `StaticWhitelist`, `RecordingPublisher`: deterministic
//!   stand-ins for scenario tests

pub mod clock;
pub mod doubles;

pub use clock::{FixedClock, LocalClock};
pub use doubles::{RecordingPublisher, StaticWhitelist};
