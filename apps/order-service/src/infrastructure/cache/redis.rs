//! Redis market cache.
//!
//! Markets are stored as a JSON array under the caller's key with `SET EX`.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

use crate::application::ports::MarketCache;
use crate::domain::Market;
use crate::error::OrderError;

/// Connection settings for the Redis cache.
#[derive(Clone, PartialEq, Eq)]
pub struct RedisSettings {
    /// Host name or address.
    pub host: String,
    /// TCP port.
    pub port: u16,
    /// Optional password.
    pub password: Option<String>,
    /// Database index.
    pub db: i64,
}

impl RedisSettings {
    /// Connection URL in `redis://` form.
    #[must_use]
    pub fn url(&self) -> String {
        match &self.password {
            Some(password) => format!(
                "redis://:{password}@{}:{}/{}",
                self.host, self.port, self.db
            ),
            None => format!("redis://{}:{}/{}", self.host, self.port, self.db),
        }
    }
}

impl fmt::Debug for RedisSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("db", &self.db)
            .finish()
    }
}

/// `MarketCache` backed by Redis.
#[derive(Clone)]
pub struct RedisMarketCache {
    conn: ConnectionManager,
}

impl RedisMarketCache {
    /// Open a managed connection to Redis.
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` if the URL is invalid or the server cannot be reached.
    pub async fn connect(settings: &RedisSettings) -> Result<Self, OrderError> {
        let client = redis::Client::open(settings.url()).map_err(transport_error)?;
        let conn = client
            .get_connection_manager()
            .await
            .map_err(transport_error)?;

        tracing::info!(host = %settings.host, port = settings.port, db = settings.db, "Connected to Redis");
        Ok(Self { conn })
    }
}

#[async_trait]
impl MarketCache for RedisMarketCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<Market>>, OrderError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(key).await.map_err(transport_error)?;

        let Some(raw) = raw else {
            tracing::debug!(key, "Market cache miss");
            return Ok(None);
        };

        let markets = serde_json::from_str(&raw).map_err(|e| {
            tracing::error!(key, error = %e, "Failed to decode cached markets");
            OrderError::serialization("failed to deserialize cached markets")
        })?;
        Ok(Some(markets))
    }

    async fn set(&self, key: &str, markets: &[Market], ttl: Duration) -> Result<(), OrderError> {
        let payload = serde_json::to_string(markets).map_err(|e| {
            tracing::error!(key, error = %e, "Failed to encode markets");
            OrderError::serialization("failed to serialize markets")
        })?;

        let mut conn = self.conn.clone();
        let () = conn
            .set_ex(key, payload, ttl.as_secs().max(1))
            .await
            .map_err(transport_error)?;
        tracing::debug!(key, ttl_secs = ttl.as_secs(), "Market cache filled");
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<(), OrderError> {
        let mut conn = self.conn.clone();
        let _: i64 = conn.del(key).await.map_err(transport_error)?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), OrderError> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(transport_error)?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}

#[allow(clippy::needless_pass_by_value)]
fn transport_error(err: redis::RedisError) -> OrderError {
    tracing::error!(error = %err, "Redis error");
    OrderError::cache_unavailable("redis is unavailable")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(password: Option<&str>) -> RedisSettings {
        RedisSettings {
            host: "cache.internal".to_string(),
            port: 6380,
            password: password.map(ToString::to_string),
            db: 2,
        }
    }

    #[test]
    fn url_without_password() {
        assert_eq!(settings(None).url(), "redis://cache.internal:6380/2");
    }

    #[test]
    fn url_with_password() {
        assert_eq!(
            settings(Some("s3cret")).url(),
            "redis://:s3cret@cache.internal:6380/2"
        );
    }

    #[test]
    fn debug_redacts_password() {
        let rendered = format!("{:?}", settings(Some("s3cret")));
        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
