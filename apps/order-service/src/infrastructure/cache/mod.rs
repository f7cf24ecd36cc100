//! Market Authorization Cache
//!
//! `MarketCache` adapters: Redis when `REDIS_HOST` is configured, otherwise
//! a process-local map with the same TTL semantics.

mod in_memory;
mod redis;

pub use in_memory::InMemoryMarketCache;
pub use self::redis::{RedisMarketCache, RedisSettings};
