//! Infrastructure Layer - Adapters and external integrations.
//!
//! This layer contains the concrete implementations of the port interfaces
//! defined in the application layer, plus the process-level concerns.

/// Market authorization cache adapters (Redis, in-memory).
pub mod cache;

/// Configuration loading.
pub mod config;

/// gRPC server, generated bindings and wire conversions.
pub mod grpc;

/// Health check HTTP endpoint.
pub mod health;

/// Upstream spot instrument market directory client.
pub mod market_directory;

/// Prometheus metrics instrumentation.
pub mod metrics;

/// Order persistence adapters.
pub mod persistence;

/// Logging and OpenTelemetry tracing.
pub mod telemetry;

/// Built-in user directory.
pub mod users;
