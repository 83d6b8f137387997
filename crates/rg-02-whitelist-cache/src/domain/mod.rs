//! # Domain Layer
//!
//! Pure snapshot construction: stored rows in, immutable snapshot out.

pub mod builder;
pub mod errors;

pub use builder::{build_snapshot, BuiltSnapshot, ReloadReport, SkippedRow};
pub use errors::CacheError;
