//! Tradable markets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Market identifier.
pub type MarketId = Uuid;

/// A market a user may be authorized to trade in.
///
/// Serialized as JSON when cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Market {
    /// Market identifier.
    pub id: MarketId,
    /// Display name.
    pub name: String,
    /// Whether trading is enabled.
    pub enabled: bool,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update timestamp.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Soft-delete timestamp.
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Market {
    /// Create an enabled market with no timestamps.
    #[must_use]
    pub fn new(id: MarketId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            enabled: true,
            created_at: None,
            updated_at: None,
            deleted_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_keeps_every_field() {
        let mut market = Market::new(Uuid::new_v4(), "BTC-USDT");
        market.created_at = Some(Utc::now());
        let json = serde_json::to_string(&market).unwrap();
        let back: Market = serde_json::from_str(&json).unwrap();
        assert_eq!(back, market);
    }

    #[test]
    fn missing_timestamps_default_to_none() {
        let id = Uuid::new_v4();
        let json = format!(r#"{{"id":"{id}","name":"ETH-USDT","enabled":false}}"#);
        let market: Market = serde_json::from_str(&json).unwrap();
        assert_eq!(market.id, id);
        assert!(!market.enabled);
        assert!(market.created_at.is_none());
    }
}
