//! # Bus Topics
//!
//! Topic names used on the message broker and on the internal dispatcher.
//! Routing is an exact string match on these names.

/// Inbound access requests carrying `{ "licensePlate": ... }`.
pub const ACCESS_REQUEST: &str = "alpr/ramp/req";

/// Outbound actuation commands for the ramp controller.
pub const RAMP_COMMAND: &str = "alpr/ramp/cmd";

/// Whitelist mutation notifications. Emitted by the CRUD layer and accepted
/// from the broker as well.
pub const WHITELIST_REFRESH: &str = "alpr/refresh/lp/whitelist";

/// Reserved diagnostic topic. Consumed without effect.
pub const ADMIN_TEST: &str = "admin/test";

/// Topics subscribed on the broker when none are configured.
pub const DEFAULT_SUBSCRIPTIONS: [&str; 3] = [ADMIN_TEST, ACCESS_REQUEST, WHITELIST_REFRESH];
