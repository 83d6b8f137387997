//! # Adapters
//!
//! Port implementations connecting the components.
//!
//! - `CacheView`: rg-02's cache as rg-03's `WhitelistView`
//! - `MqttCommandPublisher`: rg-01's publisher as rg-03's `CommandPublisher`
//! - `AdminTestHandler`: consumer for `admin/test`

pub mod admin;
pub mod cache_view;
pub mod publisher;

pub use admin::AdminTestHandler;
pub use cache_view::CacheView;
pub use publisher::MqttCommandPublisher;
