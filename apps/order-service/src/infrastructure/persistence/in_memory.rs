//! In-memory order repository.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::application::ports::OrderRepository;
use crate::domain::{NewOrder, Order, OrderId};
use crate::error::OrderError;

/// Process-local `OrderRepository`. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryOrderRepository {
    orders: RwLock<HashMap<OrderId, Order>>,
}

impl InMemoryOrderRepository {
    /// Create a new empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored orders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.read().len()
    }

    /// Whether the repository is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.read().is_empty()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn create(&self, draft: NewOrder) -> Result<Order, OrderError> {
        let mut orders = self.orders.write();
        // v4 collisions are practically impossible; redraw rather than overwrite.
        loop {
            if let Entry::Vacant(slot) = orders.entry(Uuid::new_v4()) {
                let order = Order::create(*slot.key(), draft, Utc::now());
                slot.insert(order.clone());
                return Ok(order);
            }
        }
    }

    async fn get(&self, id: OrderId) -> Result<Order, OrderError> {
        self.orders
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| OrderError::order_not_found(&id.to_string()))
    }

    async fn update(&self, id: OrderId, order: Order) -> Result<Order, OrderError> {
        let mut orders = self.orders.write();
        let stored = orders
            .get_mut(&id)
            .ok_or_else(|| OrderError::order_not_found(&id.to_string()))?;
        stored.apply_changes(&order);
        Ok(stored.clone())
    }

    async fn count(&self) -> Option<usize> {
        Some(self.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OrderStatus;
    use crate::error::ErrorCode;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn draft() -> NewOrder {
        NewOrder {
            user_id: Uuid::new_v4(),
            market_id: Uuid::new_v4(),
            quantity: 3,
            order_type: "buy".to_string(),
            price: "19.99".parse().unwrap(),
        }
    }

    #[tokio::test]
    async fn create_assigns_identity_and_created_status() {
        let repo = InMemoryOrderRepository::new();
        let order = repo.create(draft()).await.unwrap();

        assert_eq!(order.status(), OrderStatus::Created);
        assert_eq!(order.created_at(), order.updated_at());
        assert_eq!(repo.get(order.id()).await.unwrap(), order);
        assert_eq!(repo.count().await, Some(1));
    }

    #[tokio::test]
    async fn get_unknown_is_not_found() {
        let repo = InMemoryOrderRepository::new();
        let err = repo.get(Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::OrderNotFound);
    }

    #[tokio::test]
    async fn update_unknown_is_not_found() {
        let repo = InMemoryOrderRepository::new();
        let ghost = Order::create(Uuid::new_v4(), draft(), Utc::now());
        let err = repo.update(ghost.id(), ghost).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::OrderNotFound);
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn update_keeps_identity_and_owner() {
        let repo = InMemoryOrderRepository::new();
        let order = repo.create(draft()).await.unwrap();

        let mut changed = order.clone();
        changed.advance(Utc::now());
        let stored = repo.update(order.id(), changed).await.unwrap();

        assert_eq!(stored.id(), order.id());
        assert_eq!(stored.user_id(), order.user_id());
        assert_eq!(stored.created_at(), order.created_at());
        assert_eq!(stored.status(), OrderStatus::Pending);
    }

    #[tokio::test]
    async fn concurrent_creates_are_distinct() {
        let repo = Arc::new(InMemoryOrderRepository::new());
        let handles: Vec<_> = (0..64)
            .map(|_| {
                let repo = Arc::clone(&repo);
                tokio::spawn(async move { repo.create(draft()).await.unwrap().id() })
            })
            .collect();

        let mut ids = HashSet::new();
        for handle in handles {
            ids.insert(handle.await.unwrap());
        }
        assert_eq!(ids.len(), 64);
        assert_eq!(repo.len(), 64);
    }
}
