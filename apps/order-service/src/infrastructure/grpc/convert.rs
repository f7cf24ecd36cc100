//! Wire/domain conversions.

use chrono::{DateTime, Utc};
use prost_types::Timestamp;
use uuid::Uuid;

use super::proto::order::v1 as order_proto;
use super::proto::spot::v1 as spot_proto;
use crate::domain::{Market, OrderStatus};
use crate::error::OrderError;

/// Convert a UTC time to a protobuf timestamp.
#[must_use]
pub fn datetime_to_timestamp(dt: DateTime<Utc>) -> Timestamp {
    Timestamp {
        seconds: dt.timestamp(),
        nanos: i32::try_from(dt.timestamp_subsec_nanos()).unwrap_or(i32::MAX),
    }
}

/// Convert a protobuf timestamp to UTC. Out-of-range values give `None`.
#[must_use]
pub fn timestamp_to_datetime(ts: &Timestamp) -> Option<DateTime<Utc>> {
    let nanos = u32::try_from(ts.nanos).ok()?;
    DateTime::from_timestamp(ts.seconds, nanos)
}

/// Parse a textual UUID from a request field.
///
/// # Errors
///
/// Returns `InvalidArgument` naming `field` when `raw` is not a UUID.
pub fn parse_uuid(field: &str, raw: &str) -> Result<Uuid, OrderError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| OrderError::invalid_argument(field, format!("{field} is not a valid uuid")))
}

/// Domain status to wire enum.
#[must_use]
pub const fn status_to_proto(status: OrderStatus) -> order_proto::OrderStatus {
    match status {
        OrderStatus::Created => order_proto::OrderStatus::Created,
        OrderStatus::Pending => order_proto::OrderStatus::Pending,
        OrderStatus::WaitSeller => order_proto::OrderStatus::WaitSeller,
        OrderStatus::Paid => order_proto::OrderStatus::Paid,
        OrderStatus::OnHold => order_proto::OrderStatus::OnHold,
        OrderStatus::Processing => order_proto::OrderStatus::Processing,
        OrderStatus::Packed => order_proto::OrderStatus::Packed,
        OrderStatus::OutOfDelivery => order_proto::OrderStatus::OutOfDelivery,
        OrderStatus::OnTheWay => order_proto::OrderStatus::OnTheWay,
        OrderStatus::Delivered => order_proto::OrderStatus::Delivered,
        OrderStatus::Closed => order_proto::OrderStatus::Closed,
    }
}

/// Wire market to domain market.
///
/// # Errors
///
/// Returns `InvalidArgument` if the market id is not a UUID.
pub fn market_from_proto(market: spot_proto::Market) -> Result<Market, OrderError> {
    Ok(Market {
        id: parse_uuid("market.id", &market.id)?,
        name: market.name,
        enabled: market.enabled,
        created_at: market.created_at.as_ref().and_then(timestamp_to_datetime),
        updated_at: market.updated_at.as_ref().and_then(timestamp_to_datetime),
        deleted_at: market.deleted_at.as_ref().and_then(timestamp_to_datetime),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn datetime_round_trips_through_timestamp() {
        let dt = Utc::now();
        let ts = datetime_to_timestamp(dt);
        assert_eq!(ts.seconds, dt.timestamp());
        assert_eq!(timestamp_to_datetime(&ts), Some(dt));
    }

    #[test]
    fn negative_nanos_are_rejected() {
        let ts = Timestamp {
            seconds: 0,
            nanos: -1,
        };
        assert_eq!(timestamp_to_datetime(&ts), None);
    }

    #[test]
    fn status_mapping_preserves_order() {
        let wire: Vec<i32> = OrderStatus::SEQUENCE
            .iter()
            .map(|s| status_to_proto(*s) as i32)
            .collect();
        assert_eq!(wire, (1..=11).collect::<Vec<_>>());
        assert_eq!(
            status_to_proto(OrderStatus::Closed).as_str_name(),
            OrderStatus::Closed.as_str()
        );
    }

    #[test]
    fn market_with_bad_id_is_invalid_argument() {
        let market = spot_proto::Market {
            id: "not-a-uuid".to_string(),
            name: "BTC-USDT".to_string(),
            enabled: true,
            ..Default::default()
        };
        let err = market_from_proto(market).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn market_converts_timestamps() {
        let id = Uuid::new_v4();
        let market = spot_proto::Market {
            id: id.to_string(),
            name: "ETH-USDT".to_string(),
            enabled: false,
            created_at: Some(Timestamp {
                seconds: 1_700_000_000,
                nanos: 0,
            }),
            ..Default::default()
        };
        let domain = market_from_proto(market).unwrap();
        assert_eq!(domain.id, id);
        assert!(!domain.enabled);
        assert_eq!(domain.created_at.map(|t| t.timestamp()), Some(1_700_000_000));
        assert!(domain.updated_at.is_none());
    }

    #[test]
    fn parse_uuid_names_field() {
        let err = parse_uuid("order_id", "xyz").unwrap_err();
        assert_eq!(err.context()[0], ("field".to_string(), "order_id".to_string()));
    }
}
