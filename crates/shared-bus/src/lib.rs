//! # Shared Bus - Internal Event Dispatcher
//!
//! Merges broker messages and internally raised mutation notifications into
//! a single ordered event stream, and delivers each event to the registered
//! handlers one after another.
//!
//! ## Single Timeline
//!
//! ```text
//! ┌────────────────┐   emit()              ┌────────────────────┐
//! │ Bus Connection │ ─────┐                │ WhitelistRefresh   │
//! └────────────────┘      │                │ (rg-02)            │
//!                         ▼                └────────────────────┘
//!                   ┌────────────┐  dispatch()       ↑
//!                   │   mpsc     │ ──────────────────┤  (sequential)
//!                   │  channel   │                   ↓
//!                   └────────────┘         ┌────────────────────┐
//!                         ▲                │ AccessRequest      │
//! ┌────────────────┐      │                │ (rg-03)            │
//! │ CRUD layer     │ ─────┘                └────────────────────┘
//! │ (notifier)     │   notify_whitelist_changed()
//! └────────────────┘
//! ```
//!
//! One task drains the channel. A handler's `handle` future completes
//! before the next handler (or the next event) starts, so handlers never
//! race each other on shared state.
//!
//! Routing is an exact match on the topic string.

pub mod dispatcher;
pub mod emitter;
pub mod events;

// Re-export main types
pub use dispatcher::{DispatchError, EventDispatcher, EventHandler};
pub use emitter::{EventEmitter, MutationNotifier};
pub use events::{BusEvent, EventFilter, EventOrigin};

/// Maximum events buffered between producers and the dispatch loop.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;
