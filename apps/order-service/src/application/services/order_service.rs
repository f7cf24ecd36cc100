//! Order Service
//!
//! Orchestrates the three order operations over the ports:
//!
//! - `create_order`: role check, market authorization (cache with refill
//!   from the market directory), price parsing and persistence
//! - `get_order_status`: owner-checked status lookup
//! - `subscribe_order_status`: owner-checked hand-off to the status streamer

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::status_streamer::{DEFAULT_STATUS_TICK, StatusEvent, StatusStream, StatusStreamer};
use crate::application::ports::{
    MarketCache, MarketDirectory, OrderRepository, UserDirectory, market_cache_key,
};
use crate::domain::{Market, NewOrder, Order, OrderId, OrderStatus, User, UserId};
use crate::error::OrderError;
use crate::infrastructure::metrics::{self, CacheLookup, UpstreamOutcome};

/// Default lifetime of a cached market authorization.
pub const DEFAULT_MARKET_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Tunables for the order service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderServiceConfig {
    /// TTL passed to the market cache on refill.
    pub market_cache_ttl: Duration,
    /// Interval between status transitions in a subscription.
    pub status_tick: Duration,
}

impl Default for OrderServiceConfig {
    fn default() -> Self {
        Self {
            market_cache_ttl: DEFAULT_MARKET_CACHE_TTL,
            status_tick: DEFAULT_STATUS_TICK,
        }
    }
}

/// Request to create an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOrderCommand {
    /// Caller.
    pub user_id: UserId,
    /// Target market.
    pub market_id: Uuid,
    /// Free-form order tag.
    pub order_type: String,
    /// Decimal price as text.
    pub price: String,
    /// Quantity, must be positive.
    pub quantity: i64,
    /// Roles the caller claims to hold.
    pub user_roles: Vec<String>,
}

/// Result of a successful create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreatedOrder {
    /// Assigned identity.
    pub id: OrderId,
    /// Initial status.
    pub status: OrderStatus,
}

/// Orchestrator over orders, users and market authorization.
pub struct OrderService {
    orders: Arc<dyn OrderRepository>,
    users: Arc<dyn UserDirectory>,
    market_cache: Arc<dyn MarketCache>,
    market_directory: Arc<dyn MarketDirectory>,
    streamer: StatusStreamer,
    config: OrderServiceConfig,
}

impl OrderService {
    /// Wire the service to its collaborators.
    #[must_use]
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        users: Arc<dyn UserDirectory>,
        market_cache: Arc<dyn MarketCache>,
        market_directory: Arc<dyn MarketDirectory>,
        config: OrderServiceConfig,
    ) -> Self {
        let streamer = StatusStreamer::new(Arc::clone(&orders), config.status_tick);
        Self {
            orders,
            users,
            market_cache,
            market_directory,
            streamer,
            config,
        }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &OrderServiceConfig {
        &self.config
    }

    /// Number of live status subscriptions.
    #[must_use]
    pub fn active_subscriptions(&self) -> usize {
        self.streamer.active_subscriptions()
    }

    /// The order store.
    #[must_use]
    pub fn orders(&self) -> &Arc<dyn OrderRepository> {
        &self.orders
    }

    /// The market cache.
    #[must_use]
    pub fn market_cache(&self) -> &Arc<dyn MarketCache> {
        &self.market_cache
    }

    /// Create an order for a user whose roles grant market access.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for empty roles, non-positive quantity or a bad price
    /// - `NotFound` for an unknown user or when no market is available
    /// - `PermissionDenied` when the user holds none of the claimed roles
    /// - `Unavailable` / `Internal` from the cache, directory or store
    #[tracing::instrument(
        skip(self, cmd),
        fields(user_id = %cmd.user_id, market_id = %cmd.market_id)
    )]
    pub async fn create_order(&self, cmd: CreateOrderCommand) -> Result<CreatedOrder, OrderError> {
        if cmd.user_roles.is_empty() {
            return Err(OrderError::invalid_argument(
                "user_roles",
                "user roles must not be empty",
            ));
        }
        if cmd.quantity <= 0 {
            return Err(OrderError::invalid_argument(
                "quantity",
                "quantity must be positive",
            ));
        }

        let user = self.users.get_user(cmd.user_id).await.inspect_err(|e| {
            tracing::warn!(error = %e, "User lookup failed");
        })?;

        if !user.has_any_role(&cmd.user_roles) {
            tracing::warn!(claimed = ?cmd.user_roles, "User has no access to market");
            return Err(OrderError::no_market_access(&user.id.to_string()));
        }

        let markets = self.authorized_markets(&user).await?;
        tracing::debug!(markets = markets.len(), "Market authorization resolved");

        let price = parse_price(&cmd.price)?;

        let order = self
            .orders
            .create(NewOrder {
                user_id: cmd.user_id,
                market_id: cmd.market_id,
                quantity: cmd.quantity,
                order_type: cmd.order_type,
                price,
            })
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to persist order"))?;

        metrics::record_order_created();
        tracing::info!(order_id = %order.id(), "Order created");

        Ok(CreatedOrder {
            id: order.id(),
            status: order.status(),
        })
    }

    /// Current status of an order owned by `user_id`.
    ///
    /// # Errors
    ///
    /// - `NotFound` for an unknown order
    /// - `PermissionDenied` when the caller does not own the order
    #[tracing::instrument(skip(self))]
    pub async fn get_order_status(
        &self,
        user_id: UserId,
        order_id: OrderId,
    ) -> Result<StatusEvent, OrderError> {
        let order = self.load_owned(user_id, order_id).await?;
        tracing::debug!(status = %order.status(), "Order status read");
        Ok(StatusEvent::from(&order))
    }

    /// Stream the lifecycle of an order owned by `user_id`.
    ///
    /// Errors are only returned before streaming starts; see
    /// [`StatusStreamer::subscribe`] for stream termination.
    ///
    /// # Errors
    ///
    /// - `NotFound` for an unknown order
    /// - `PermissionDenied` when the caller does not own the order
    #[tracing::instrument(skip(self, cancel))]
    pub async fn subscribe_order_status(
        &self,
        user_id: UserId,
        order_id: OrderId,
        cancel: CancellationToken,
    ) -> Result<StatusStream, OrderError> {
        let order = self.load_owned(user_id, order_id).await?;
        tracing::info!(status = %order.status(), "Status subscription started");
        Ok(self.streamer.subscribe(order, cancel))
    }

    async fn load_owned(&self, user_id: UserId, order_id: OrderId) -> Result<Order, OrderError> {
        let order = self.orders.get(order_id).await?;
        if !order.is_owned_by(user_id) {
            tracing::warn!("Caller does not own order");
            return Err(OrderError::invalid_user_id(
                &user_id.to_string(),
                &order_id.to_string(),
            ));
        }
        Ok(order)
    }

    /// Markets visible to the user, from cache or refilled from the directory.
    ///
    /// Concurrent misses for the same user each call the directory.
    async fn authorized_markets(&self, user: &User) -> Result<Vec<Market>, OrderError> {
        let key = market_cache_key(user.id);

        if let Some(markets) = self.market_cache.get(&key).await?
            && !markets.is_empty()
        {
            metrics::record_cache_lookup(CacheLookup::Hit);
            return Ok(markets);
        }
        metrics::record_cache_lookup(CacheLookup::Miss);

        let markets = self
            .market_directory
            .view_markets_by_roles(user.role_list())
            .await
            .inspect_err(|e| {
                metrics::record_upstream_call(UpstreamOutcome::Error);
                tracing::error!(error = %e, "Market directory call failed");
            })?;
        metrics::record_upstream_call(UpstreamOutcome::Ok);

        if markets.is_empty() {
            tracing::warn!("No markets available for user roles");
            return Err(OrderError::market_not_found(&user.id.to_string()));
        }

        self.market_cache
            .set(&key, &markets, self.config.market_cache_ttl)
            .await?;

        Ok(markets)
    }
}

fn parse_price(raw: &str) -> Result<Decimal, OrderError> {
    Decimal::from_str_exact(raw.trim())
        .map_err(|e| OrderError::invalid_argument("price", format!("invalid price: {e}")))
}
