//! Postgres order repository.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;

use crate::application::ports::OrderRepository;
use crate::domain::{NewOrder, Order, OrderId, OrderStatus, ReconstitutedOrder};
use crate::error::OrderError;

const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS orders (
    id          UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id     UUID NOT NULL,
    market_id   UUID NOT NULL,
    quantity    BIGINT NOT NULL,
    type        TEXT NOT NULL,
    status      TEXT NOT NULL,
    price       NUMERIC NOT NULL,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
    deleted_at  TIMESTAMPTZ
)";

/// `OrderRepository` over a Postgres `orders` table.
#[derive(Debug, Clone)]
pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    /// Connect a pool and make sure the `orders` table exists.
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` if the database cannot be reached or the
    /// schema statement fails.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, OrderError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(store_error)?;

        sqlx::query(SCHEMA)
            .execute(&pool)
            .await
            .map_err(store_error)?;

        tracing::info!(max_connections, "Connected to Postgres order store");
        Ok(Self { pool })
    }

    /// Wrap an existing pool. The schema is assumed to exist.
    #[must_use]
    pub const fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    async fn create(&self, draft: NewOrder) -> Result<Order, OrderError> {
        let status = OrderStatus::initial();
        let row = sqlx::query(
            r"
            INSERT INTO orders (user_id, market_id, quantity, type, status, price)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, created_at
            ",
        )
        .bind(draft.user_id)
        .bind(draft.market_id)
        .bind(draft.quantity)
        .bind(&draft.order_type)
        .bind(status.as_str())
        .bind(draft.price)
        .fetch_one(&self.pool)
        .await
        .map_err(store_error)?;

        let id: OrderId = row.try_get("id").map_err(store_error)?;
        let created_at: DateTime<Utc> = row.try_get("created_at").map_err(store_error)?;
        Ok(Order::create(id, draft, created_at))
    }

    async fn get(&self, id: OrderId) -> Result<Order, OrderError> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, market_id, quantity, type, status, price,
                   created_at, updated_at, deleted_at
            FROM orders
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?
        .ok_or_else(|| OrderError::order_not_found(&id.to_string()))?;

        order_from_row(&row)
    }

    async fn update(&self, id: OrderId, order: Order) -> Result<Order, OrderError> {
        let result = sqlx::query(
            r"
            UPDATE orders
            SET market_id = $1, quantity = $2, type = $3, status = $4, price = $5, updated_at = $6
            WHERE id = $7
            ",
        )
        .bind(order.market_id())
        .bind(order.quantity())
        .bind(order.order_type())
        .bind(order.status().as_str())
        .bind(order.price())
        .bind(order.updated_at())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(store_error)?;

        if result.rows_affected() == 0 {
            return Err(OrderError::order_not_found(&id.to_string()));
        }
        Ok(order)
    }

    async fn count(&self) -> Option<usize> {
        let count: i64 = sqlx::query_scalar("SELECT count(*) FROM orders")
            .fetch_one(&self.pool)
            .await
            .ok()?;
        usize::try_from(count).ok()
    }
}

fn order_from_row(row: &PgRow) -> Result<Order, OrderError> {
    let status: String = row.try_get("status").map_err(store_error)?;
    let status = OrderStatus::from_str(&status)
        .map_err(|e| OrderError::internal(format!("corrupt order row: {e}")))?;
    let price: Decimal = row.try_get("price").map_err(store_error)?;

    Ok(Order::reconstitute(ReconstitutedOrder {
        id: row.try_get("id").map_err(store_error)?,
        user_id: row.try_get("user_id").map_err(store_error)?,
        market_id: row.try_get("market_id").map_err(store_error)?,
        quantity: row.try_get("quantity").map_err(store_error)?,
        order_type: row.try_get("type").map_err(store_error)?,
        price,
        status,
        created_at: row.try_get("created_at").map_err(store_error)?,
        updated_at: row.try_get("updated_at").map_err(store_error)?,
        deleted_at: row.try_get("deleted_at").map_err(store_error)?,
    }))
}

#[allow(clippy::needless_pass_by_value)]
fn store_error(err: sqlx::Error) -> OrderError {
    tracing::error!(error = %err, "Order store error");
    OrderError::store_unavailable("order store is unavailable")
}
