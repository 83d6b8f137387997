//! # Shared Types Crate
//!
//! This crate contains the whitelist entities, the bus payloads and the
//! error taxonomy shared by every gate component.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-component types are defined here.
//! - **Calendar semantics**: Validity bounds are calendar dates. Time of day
//!   and offsets are normalized away when a stored bound is parsed.
//! - **Snapshots are values**: A `WhitelistSnapshot` is immutable once built;
//!   freshness is achieved by replacing it, never by patching it.

pub mod calendar;
pub mod entities;
pub mod errors;
pub mod plate;
pub mod snapshot;
pub mod topics;

pub use calendar::{parse_calendar_date, ValidityWindow};
pub use entities::*;
pub use errors::*;
pub use plate::{normalize_plate, PlateMatching};
pub use snapshot::WhitelistSnapshot;
