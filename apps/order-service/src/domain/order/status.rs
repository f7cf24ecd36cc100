//! Order status lifecycle.

use std::fmt;
use std::str::FromStr;

/// Status of an order in its fixed, totally ordered lifecycle.
///
/// Progression is strictly forward, one position at a time, from
/// [`OrderStatus::Created`] to the terminal [`OrderStatus::Closed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OrderStatus {
    /// Order accepted and persisted.
    Created,
    /// Awaiting processing.
    Pending,
    /// Waiting for the seller to confirm.
    WaitSeller,
    /// Payment captured.
    Paid,
    /// Temporarily held.
    OnHold,
    /// Being prepared.
    Processing,
    /// Packed for shipment.
    Packed,
    /// Handed over for delivery.
    OutOfDelivery,
    /// In transit.
    OnTheWay,
    /// Delivered to the buyer.
    Delivered,
    /// Terminal state.
    Closed,
}

impl OrderStatus {
    /// The full lifecycle, in order.
    pub const SEQUENCE: [Self; 11] = [
        Self::Created,
        Self::Pending,
        Self::WaitSeller,
        Self::Paid,
        Self::OnHold,
        Self::Processing,
        Self::Packed,
        Self::OutOfDelivery,
        Self::OnTheWay,
        Self::Delivered,
        Self::Closed,
    ];

    /// Status assigned to every newly created order.
    #[must_use]
    pub const fn initial() -> Self {
        Self::Created
    }

    /// Returns true for the last status of the lifecycle.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Closed)
    }

    /// Zero-based position in [`Self::SEQUENCE`].
    #[must_use]
    pub const fn position(self) -> usize {
        self as usize
    }

    /// The status that follows this one, or `None` when terminal.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Created => Some(Self::Pending),
            Self::Pending => Some(Self::WaitSeller),
            Self::WaitSeller => Some(Self::Paid),
            Self::Paid => Some(Self::OnHold),
            Self::OnHold => Some(Self::Processing),
            Self::Processing => Some(Self::Packed),
            Self::Packed => Some(Self::OutOfDelivery),
            Self::OutOfDelivery => Some(Self::OnTheWay),
            Self::OnTheWay => Some(Self::Delivered),
            Self::Delivered => Some(Self::Closed),
            Self::Closed => None,
        }
    }

    /// Stable storage name (`ORDER_STATUS_*`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "ORDER_STATUS_CREATED",
            Self::Pending => "ORDER_STATUS_PENDING",
            Self::WaitSeller => "ORDER_STATUS_WAIT_SELLER",
            Self::Paid => "ORDER_STATUS_PAID",
            Self::OnHold => "ORDER_STATUS_ON_HOLD",
            Self::Processing => "ORDER_STATUS_PROCESSING",
            Self::Packed => "ORDER_STATUS_PACKED",
            Self::OutOfDelivery => "ORDER_STATUS_OUT_OF_DELIVERY",
            Self::OnTheWay => "ORDER_STATUS_ON_THE_WAY",
            Self::Delivered => "ORDER_STATUS_DELIVERED",
            Self::Closed => "ORDER_STATUS_CLOSED",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A status name that is not part of the lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown order status: {0}")]
pub struct UnknownOrderStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownOrderStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::SEQUENCE
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownOrderStatus(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn sequence_starts_at_created_and_ends_at_closed() {
        assert_eq!(OrderStatus::SEQUENCE[0], OrderStatus::initial());
        assert_eq!(OrderStatus::SEQUENCE[10], OrderStatus::Closed);
        assert!(OrderStatus::Closed.is_terminal());
        assert!(OrderStatus::Closed.next().is_none());
    }

    #[test]
    fn only_closed_is_terminal() {
        let terminal: Vec<_> = OrderStatus::SEQUENCE
            .into_iter()
            .filter(|s| s.is_terminal())
            .collect();
        assert_eq!(terminal, vec![OrderStatus::Closed]);
    }

    #[test]
    fn walking_next_visits_whole_sequence() {
        let mut visited = vec![OrderStatus::initial()];
        let mut current = OrderStatus::initial();
        while let Some(next) = current.next() {
            visited.push(next);
            current = next;
        }
        assert_eq!(visited, OrderStatus::SEQUENCE.to_vec());
    }

    #[test]
    fn parses_storage_names() {
        assert_eq!(
            "ORDER_STATUS_OUT_OF_DELIVERY".parse::<OrderStatus>(),
            Ok(OrderStatus::OutOfDelivery)
        );
        assert_eq!(
            "closed".parse::<OrderStatus>(),
            Err(UnknownOrderStatus("closed".to_string()))
        );
    }

    proptest! {
        #[test]
        fn next_moves_exactly_one_position(idx in 0usize..10) {
            let status = OrderStatus::SEQUENCE[idx];
            let next = status.next().unwrap();
            prop_assert_eq!(next.position(), status.position() + 1);
            prop_assert!(next > status);
        }

        #[test]
        fn storage_name_round_trips(idx in 0usize..11) {
            let status = OrderStatus::SEQUENCE[idx];
            prop_assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
    }
}
