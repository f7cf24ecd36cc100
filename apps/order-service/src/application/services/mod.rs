//! Application Services
//!
//! - [`OrderService`]: Order creation, status reads and subscriptions
//! - [`StatusStreamer`]: Per-subscription status lifecycle tasks

mod order_service;
mod status_streamer;

pub use order_service::{
    CreateOrderCommand, CreatedOrder, DEFAULT_MARKET_CACHE_TTL, OrderService, OrderServiceConfig,
};
pub use status_streamer::{DEFAULT_STATUS_TICK, StatusEvent, StatusStream, StatusStreamer};
