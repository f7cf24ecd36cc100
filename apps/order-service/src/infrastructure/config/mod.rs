//! Configuration Module
//!
//! Environment-driven configuration for the order service.

mod settings;

pub use settings::{
    ConfigError, MAX_DURATION_SECS, OrderStoreSettings, PostgresSettings, ServerSettings,
    ServiceConfig, TlsSettings,
};
