//! Process-local market cache.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::time::Instant;

use crate::application::ports::MarketCache;
use crate::domain::Market;
use crate::error::OrderError;

#[derive(Debug, Clone)]
struct Entry {
    markets: Vec<Market>,
    /// `None` when the TTL runs past the clock's range.
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }
}

/// `MarketCache` backed by a map. Expired entries read as misses and are
/// dropped on the next write.
#[derive(Debug, Default)]
pub struct InMemoryMarketCache {
    entries: RwLock<HashMap<String, Entry>>,
}

impl InMemoryMarketCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MarketCache for InMemoryMarketCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<Market>>, OrderError> {
        let entries = self.entries.read();
        Ok(entries
            .get(key)
            .filter(|entry| entry.is_live(Instant::now()))
            .map(|entry| entry.markets.clone()))
    }

    async fn set(&self, key: &str, markets: &[Market], ttl: Duration) -> Result<(), OrderError> {
        let now = Instant::now();
        let mut entries = self.entries.write();
        entries.retain(|_, entry| entry.is_live(now));
        entries.insert(
            key.to_string(),
            Entry {
                markets: markets.to_vec(),
                expires_at: now.checked_add(ttl),
            },
        );
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<(), OrderError> {
        self.entries.write().remove(key);
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    const TTL: Duration = Duration::from_secs(300);

    fn markets() -> Vec<Market> {
        vec![
            Market::new(Uuid::new_v4(), "BTC-USDT"),
            Market::new(Uuid::new_v4(), "ETH-USDT"),
        ]
    }

    #[tokio::test]
    async fn set_then_get_returns_markets() {
        let cache = InMemoryMarketCache::new();
        let stored = markets();
        cache.set("markets:a", &stored, TTL).await.unwrap();
        assert_eq!(cache.get("markets:a").await.unwrap(), Some(stored));
    }

    #[tokio::test]
    async fn missing_key_is_none() {
        let cache = InMemoryMarketCache::new();
        assert_eq!(cache.get("markets:none").await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn entries_expire_after_ttl() {
        let cache = InMemoryMarketCache::new();
        cache.set("markets:a", &markets(), TTL).await.unwrap();

        tokio::time::advance(TTL - Duration::from_secs(1)).await;
        assert!(cache.get("markets:a").await.unwrap().is_some());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(cache.get("markets:a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn huge_ttl_does_not_overflow() {
        let cache = InMemoryMarketCache::new();
        let stored = markets();
        cache.set("markets:a", &stored, Duration::MAX).await.unwrap();
        assert_eq!(cache.get("markets:a").await.unwrap(), Some(stored));
    }

    #[tokio::test]
    async fn del_removes_entry() {
        let cache = InMemoryMarketCache::new();
        cache.set("markets:a", &markets(), TTL).await.unwrap();
        cache.del("markets:a").await.unwrap();
        assert_eq!(cache.get("markets:a").await.unwrap(), None);
        cache.ping().await.unwrap();
        assert_eq!(cache.backend(), "memory");
    }
}
