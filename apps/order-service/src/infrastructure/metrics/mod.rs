//! Prometheus Metrics Module
//!
//! Exposes order service metrics in Prometheus format.
//!
//! # Metrics Categories
//!
//! - **Orders**: Orders created and status transitions applied
//! - **Authorization**: Market cache hits/misses and upstream call outcomes
//! - **Subscriptions**: Live status streams and streams closed on store failure
//!
//! # Integration
//!
//! Metrics are exposed at `/metrics` on the health server port. Until
//! [`init_metrics`] runs, every recording function is a no-op.

use std::sync::OnceLock;

use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

use crate::domain::OrderStatus;

// =============================================================================
// Global Metrics Handle
// =============================================================================

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder.
///
/// Repeated calls return the handle installed by the first one.
///
/// # Errors
///
/// Returns an error if another global recorder is already installed.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    if let Some(handle) = PROMETHEUS_HANDLE.get() {
        return Ok(handle.clone());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    register_metrics();
    Ok(PROMETHEUS_HANDLE.get_or_init(|| handle).clone())
}

/// Get the Prometheus handle for rendering metrics.
///
/// Returns `None` if metrics have not been initialized.
#[must_use]
pub fn get_metrics_handle() -> Option<PrometheusHandle> {
    PROMETHEUS_HANDLE.get().cloned()
}

// =============================================================================
// Metric Registration
// =============================================================================

fn register_metrics() {
    describe_counter!(
        "order_service_orders_created_total",
        "Total orders persisted by CreateOrder"
    );
    describe_counter!(
        "order_service_status_transitions_total",
        "Total status transitions persisted by subscriptions"
    );

    describe_counter!(
        "order_service_cache_lookups_total",
        "Market cache lookups by result"
    );
    describe_counter!(
        "order_service_upstream_calls_total",
        "Market directory calls by outcome"
    );

    describe_gauge!(
        "order_service_active_subscriptions",
        "Number of running status subscriptions"
    );
    describe_counter!(
        "order_service_stream_persist_failures_total",
        "Subscriptions closed because a status could not be persisted"
    );
}

// =============================================================================
// Metric Recording Functions
// =============================================================================

/// Result of a market cache lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheLookup {
    /// A non-empty market list was cached.
    Hit,
    /// Nothing usable was cached.
    Miss,
}

impl CacheLookup {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Hit => "hit",
            Self::Miss => "miss",
        }
    }
}

/// Outcome of a market directory call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamOutcome {
    /// The call returned markets.
    Ok,
    /// The call failed.
    Error,
}

impl UpstreamOutcome {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Error => "error",
        }
    }
}

/// Record a persisted order.
pub fn record_order_created() {
    counter!("order_service_orders_created_total").increment(1);
}

/// Record a market cache lookup.
pub fn record_cache_lookup(result: CacheLookup) {
    counter!(
        "order_service_cache_lookups_total",
        "result" => result.as_str()
    )
    .increment(1);
}

/// Record a market directory call.
pub fn record_upstream_call(outcome: UpstreamOutcome) {
    counter!(
        "order_service_upstream_calls_total",
        "outcome" => outcome.as_str()
    )
    .increment(1);
}

/// Record a persisted status transition.
pub fn record_status_transition(status: OrderStatus) {
    counter!(
        "order_service_status_transitions_total",
        "status" => status.as_str()
    )
    .increment(1);
}

/// Update the live subscription count.
#[allow(clippy::cast_precision_loss)]
pub fn set_active_subscriptions(count: usize) {
    gauge!("order_service_active_subscriptions").set(count as f64);
}

/// Record a subscription closed by a store failure.
pub fn record_stream_persist_failure() {
    counter!("order_service_stream_persist_failures_total").increment(1);
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_lookup_as_str() {
        assert_eq!(CacheLookup::Hit.as_str(), "hit");
        assert_eq!(CacheLookup::Miss.as_str(), "miss");
    }

    #[test]
    fn upstream_outcome_as_str() {
        assert_eq!(UpstreamOutcome::Ok.as_str(), "ok");
        assert_eq!(UpstreamOutcome::Error.as_str(), "error");
    }

    #[test]
    fn recording_without_recorder_is_noop() {
        record_order_created();
        record_cache_lookup(CacheLookup::Miss);
        record_status_transition(OrderStatus::Pending);
        set_active_subscriptions(3);
        record_stream_persist_failure();
    }
}
