//! # Ramp Gate Test Suite
//!
//! Cross-crate scenarios driven through the dispatcher exactly as broker
//! traffic and whitelist mutations would arrive in production.
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── scenarios.rs   # access scenarios A to D
//!     └── staleness.rs   # reload/evaluation ordering
//! ```
//!
//! ```bash
//! cargo test -p rg-tests
//! ```

pub mod integration;
