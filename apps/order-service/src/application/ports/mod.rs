//! Port Interfaces
//!
//! Contracts between the order services and the outside world, following
//! the Hexagonal Architecture pattern. Infrastructure adapters implement them.
//!
//! ## Driven Ports (Outbound)
//!
//! - [`OrderRepository`]: Order persistence (in-memory, Postgres)
//! - [`UserDirectory`]: Read-only user and role lookup
//! - [`MarketCache`]: Time-bounded market authorization cache (Redis, in-memory)
//! - [`MarketDirectory`]: Source of truth for markets visible to a role set

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{Market, NewOrder, Order, OrderId, User, UserId};
use crate::error::OrderError;

/// Order persistence.
///
/// Implementations must hand out distinct identities under concurrent
/// creates and report unknown ids as `NotFound`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persist a new order, assigning its identity and creation time.
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` if the backing store cannot be reached.
    async fn create(&self, order: NewOrder) -> Result<Order, OrderError>;

    /// Load an order by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown id, `Unavailable` on store failure.
    async fn get(&self, id: OrderId) -> Result<Order, OrderError>;

    /// Replace the mutable fields of an existing order.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown id, `Unavailable` on store failure.
    async fn update(&self, id: OrderId, order: Order) -> Result<Order, OrderError>;

    /// Number of stored orders, when the backing can report it cheaply.
    async fn count(&self) -> Option<usize> {
        None
    }
}

/// Read-only user lookup.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Resolve a user and their roles.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown user.
    async fn get_user(&self, id: UserId) -> Result<User, OrderError>;
}

/// Key-value store for per-user market authorizations.
///
/// The cache stores whatever TTL it is given; callers pick the TTL.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketCache: Send + Sync {
    /// Fetch the cached markets for `key`.
    ///
    /// A miss is `Ok(None)`, never an error.
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` on transport failure and `Internal` when the
    /// stored payload cannot be decoded.
    async fn get(&self, key: &str) -> Result<Option<Vec<Market>>, OrderError>;

    /// Store `markets` under `key` for `ttl`.
    ///
    /// # Errors
    ///
    /// Returns `Internal` if serialization fails (nothing is written) and
    /// `Unavailable` on transport failure.
    async fn set(&self, key: &str, markets: &[Market], ttl: Duration) -> Result<(), OrderError>;

    /// Remove `key`.
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` on transport failure.
    async fn del(&self, key: &str) -> Result<(), OrderError>;

    /// Check that the cache can be reached.
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` when the backing store does not answer.
    async fn ping(&self) -> Result<(), OrderError> {
        Ok(())
    }

    /// Short backend name for health reporting.
    fn backend(&self) -> &'static str;
}

/// Upstream directory of markets by role.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDirectory: Send + Sync {
    /// Markets visible to holders of any of `roles`.
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` if the upstream cannot be reached and
    /// `InvalidArgument` if it returns a malformed market.
    async fn view_markets_by_roles(&self, roles: Vec<String>) -> Result<Vec<Market>, OrderError>;
}

/// Cache key for a user's market authorizations.
#[must_use]
pub fn market_cache_key(user_id: UserId) -> String {
    format!("markets:{user_id}")
}
