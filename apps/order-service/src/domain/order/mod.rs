//! Order Aggregate
//!
//! An order is a user's intent to trade a quantity of a market at an exact
//! decimal price. Its identity and owner never change after creation; only
//! the store and the status lifecycle mutate it.

mod status;

pub use status::{OrderStatus, UnknownOrderStatus};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Order identifier (random 128-bit).
pub type OrderId = Uuid;

/// Validated order contents before the store assigns an identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    /// Owning user.
    pub user_id: Uuid,
    /// Target market.
    pub market_id: Uuid,
    /// Positive quantity.
    pub quantity: i64,
    /// Free-form order tag, e.g. `buy` or `sell`.
    pub order_type: String,
    /// Exact price.
    pub price: Decimal,
}

/// Parameters for reconstituting an order from storage.
#[derive(Debug, Clone)]
pub struct ReconstitutedOrder {
    /// Order identifier.
    pub id: OrderId,
    /// Owning user.
    pub user_id: Uuid,
    /// Target market.
    pub market_id: Uuid,
    /// Quantity.
    pub quantity: i64,
    /// Order tag.
    pub order_type: String,
    /// Price.
    pub price: Decimal,
    /// Current status.
    pub status: OrderStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Soft-delete timestamp. Reserved, never set by this service.
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Order aggregate root.
#[allow(clippy::struct_field_names)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    id: OrderId,
    user_id: Uuid,
    market_id: Uuid,
    quantity: i64,
    order_type: String,
    price: Decimal,
    status: OrderStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Materialize a new order with the identity and timestamp assigned by a store.
    #[must_use]
    pub fn create(id: OrderId, draft: NewOrder, now: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id: draft.user_id,
            market_id: draft.market_id,
            quantity: draft.quantity,
            order_type: draft.order_type,
            price: draft.price,
            status: OrderStatus::initial(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Rebuild an order from persisted state.
    #[must_use]
    pub fn reconstitute(params: ReconstitutedOrder) -> Self {
        Self {
            id: params.id,
            user_id: params.user_id,
            market_id: params.market_id,
            quantity: params.quantity,
            order_type: params.order_type,
            price: params.price,
            status: params.status,
            created_at: params.created_at,
            updated_at: params.updated_at,
            deleted_at: params.deleted_at,
        }
    }

    /// Order identifier.
    #[must_use]
    pub const fn id(&self) -> OrderId {
        self.id
    }

    /// Owning user.
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.user_id
    }

    /// Target market.
    #[must_use]
    pub const fn market_id(&self) -> Uuid {
        self.market_id
    }

    /// Quantity.
    #[must_use]
    pub const fn quantity(&self) -> i64 {
        self.quantity
    }

    /// Order tag.
    #[must_use]
    pub fn order_type(&self) -> &str {
        &self.order_type
    }

    /// Price.
    #[must_use]
    pub const fn price(&self) -> Decimal {
        self.price
    }

    /// Current status.
    #[must_use]
    pub const fn status(&self) -> OrderStatus {
        self.status
    }

    /// Creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Last update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Soft-delete timestamp.
    #[must_use]
    pub const fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    /// Whether the order has reached the end of its lifecycle.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Owner check.
    #[must_use]
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }

    /// Move to the next status and stamp `updated_at`.
    ///
    /// Returns `false` without touching the order when it is already terminal.
    pub fn advance(&mut self, now: DateTime<Utc>) -> bool {
        match self.status.next() {
            Some(next) => {
                self.status = next;
                self.updated_at = now;
                true
            }
            None => false,
        }
    }

    /// Copy the mutable fields of `changes` onto this order.
    ///
    /// Identity, owner and creation time are kept.
    pub fn apply_changes(&mut self, changes: &Self) {
        self.market_id = changes.market_id;
        self.quantity = changes.quantity;
        self.order_type.clone_from(&changes.order_type);
        self.price = changes.price;
        self.status = changes.status;
        self.updated_at = changes.updated_at;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn draft() -> NewOrder {
        NewOrder {
            user_id: Uuid::new_v4(),
            market_id: Uuid::new_v4(),
            quantity: 3,
            order_type: "buy".to_string(),
            price: "101.25".parse().unwrap(),
        }
    }

    #[test]
    fn create_starts_at_initial_status() {
        let now = Utc::now();
        let order = Order::create(Uuid::new_v4(), draft(), now);
        assert_eq!(order.status(), OrderStatus::Created);
        assert_eq!(order.created_at(), now);
        assert_eq!(order.updated_at(), now);
        assert!(order.deleted_at().is_none());
        assert_eq!(order.price().to_string(), "101.25");
    }

    #[test]
    fn advance_walks_forward_and_stops_at_closed() {
        let start = Utc::now();
        let mut order = Order::create(Uuid::new_v4(), draft(), start);
        let mut steps = 0;
        let mut now = start;
        loop {
            now += Duration::seconds(5);
            if !order.advance(now) {
                break;
            }
            steps += 1;
            assert_eq!(order.updated_at(), now);
        }
        assert_eq!(steps, 10);
        assert!(order.is_terminal());

        let frozen = order.updated_at();
        assert!(!order.advance(now + Duration::seconds(5)));
        assert_eq!(order.updated_at(), frozen);
    }

    #[test]
    fn apply_changes_keeps_identity_and_owner() {
        let mut order = Order::create(Uuid::new_v4(), draft(), Utc::now());
        let original_id = order.id();
        let owner = order.user_id();

        let mut changed = Order::create(Uuid::new_v4(), draft(), Utc::now());
        changed.advance(Utc::now());
        order.apply_changes(&changed);

        assert_eq!(order.id(), original_id);
        assert_eq!(order.user_id(), owner);
        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(order.market_id(), changed.market_id());
    }

    #[test]
    fn ownership_is_by_user_id() {
        let order = Order::create(Uuid::new_v4(), draft(), Utc::now());
        assert!(order.is_owned_by(order.user_id()));
        assert!(!order.is_owned_by(Uuid::new_v4()));
    }
}
