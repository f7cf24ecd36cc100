//! Application Layer - Use cases and port definitions.
//!
//! This layer contains the application services and port interfaces
//! that define how the domain interacts with external systems.

/// Port interfaces for persistence, users, market cache and directory.
pub mod ports;

/// Order orchestration and status streaming.
pub mod services;
