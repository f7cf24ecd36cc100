#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::items_after_statements,
        clippy::similar_names
    )
)]

//! Order Service - Order Authorization and Status Lifecycle
//!
//! A gRPC service that authorizes orders against role-based market access,
//! persists them, and streams each order through a fixed status lifecycle.
//!
//! # Layers (inside → outside)
//!
//! - **Domain**: Business types with no infrastructure dependencies
//!   - `order`: Order aggregate and the status sequence
//!   - `user`: Users and role tags
//!   - `market`: Tradable markets
//!
//! - **Application**: Use cases and port definitions
//!   - `ports`: Order store, user directory, market cache, market directory
//!   - `services`: Order orchestration and status streaming
//!
//! - **Infrastructure**: Adapters and external integrations
//!   - `grpc`: `order.v1.OrderService` server and generated bindings
//!   - `market_directory`: `spot.v1.MarketService` client
//!   - `cache`: Redis and in-memory market caches
//!   - `persistence`: In-memory and Postgres order stores
//!   - `users`: Built-in user directory
//!   - `config`, `health`, `metrics`, `telemetry`: Process concerns
//!
//! # Request Flow
//!
//! ```text
//! CreateOrder ──► roles ∩ user.roles? ──► markets:{user} cached? ──no──► MarketService
//!                                               │                            │
//!                                               ▼                            ▼
//!                                          OrderRepository ◄──────── cache refill (TTL)
//!
//! SubscribeOrderStatus ──► owner? ──► snapshot ──► tick ──► advance ──► persist ──► emit
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - Business types with no external dependencies.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

/// Error types and gRPC status mapping.
pub mod error;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::{Market, MarketId, NewOrder, Order, OrderId, OrderStatus, User, UserId};

// Errors
pub use error::{ErrorCode, ErrorKind, OrderError};

// Ports and services
pub use application::ports::{MarketCache, MarketDirectory, OrderRepository, UserDirectory};
pub use application::services::{
    CreateOrderCommand, CreatedOrder, OrderService, OrderServiceConfig, StatusEvent,
    StatusStreamer,
};

// Adapters
pub use infrastructure::cache::{InMemoryMarketCache, RedisMarketCache, RedisSettings};
pub use infrastructure::market_directory::{GrpcMarketDirectory, MarketDirectoryConfig};
#[cfg(feature = "postgres")]
pub use infrastructure::persistence::PostgresOrderRepository;
pub use infrastructure::persistence::InMemoryOrderRepository;
pub use infrastructure::users::InMemoryUserDirectory;

// Infrastructure config
pub use infrastructure::config::{ConfigError, OrderStoreSettings, ServiceConfig};

// Health server
pub use infrastructure::health::{HealthServer, HealthServerError, HealthServerState};

// gRPC server (for integration tests)
pub use infrastructure::grpc::{OrderGrpcService, proto};

// Metrics
pub use infrastructure::metrics::init_metrics;

// Telemetry
pub use infrastructure::telemetry::{TelemetryConfig, TelemetryGuard, init as init_telemetry};
