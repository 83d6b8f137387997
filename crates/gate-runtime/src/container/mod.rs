//! # Runtime Container
//!
//! Configuration for the gate process.

pub mod config;

pub use config::{ConfigError, GateConfig};
