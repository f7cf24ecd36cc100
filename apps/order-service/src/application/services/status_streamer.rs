//! Status Streamer
//!
//! Drives an order through its status lifecycle on a fixed tick and emits
//! each transition to a single subscriber.
//!
//! A subscription first yields the order's current status. For a terminal
//! order that is the only event and no task is spawned. Otherwise one task
//! per subscription advances the order every tick, persists it, and emits
//! the new status until the order closes, the subscription is cancelled, or
//! a persistence call fails.
//!
//! Each transition first reserves the single channel slot, so an order is
//! never advanced while the previous event is still unread. A slow consumer
//! delays the next transition rather than queueing it, and ticks missed
//! while blocked are not replayed.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::application::ports::OrderRepository;
use crate::domain::{Order, OrderId, OrderStatus};
use crate::infrastructure::metrics;

/// Default interval between status transitions.
pub const DEFAULT_STATUS_TICK: Duration = Duration::from_secs(5);

/// A status observed for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusEvent {
    /// Order the status belongs to.
    pub order_id: OrderId,
    /// Status at the time of the event.
    pub status: OrderStatus,
    /// When the order last changed.
    pub updated_at: DateTime<Utc>,
}

impl From<&Order> for StatusEvent {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.id(),
            status: order.status(),
            updated_at: order.updated_at(),
        }
    }
}

/// Stream of status events for one subscription. Ends when the lifecycle stops.
pub type StatusStream = ReceiverStream<StatusEvent>;

/// Spawns and tracks per-subscription lifecycle tasks.
pub struct StatusStreamer {
    repository: Arc<dyn OrderRepository>,
    tick: Duration,
    active: Arc<AtomicUsize>,
}

impl StatusStreamer {
    /// Create a streamer that persists through `repository` every `tick`.
    #[must_use]
    pub fn new(repository: Arc<dyn OrderRepository>, tick: Duration) -> Self {
        Self {
            repository,
            tick,
            active: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Interval between transitions.
    #[must_use]
    pub const fn tick(&self) -> Duration {
        self.tick
    }

    /// Number of running lifecycle tasks.
    #[must_use]
    pub fn active_subscriptions(&self) -> usize {
        self.active.load(Ordering::Relaxed)
    }

    /// Start streaming the lifecycle of `order`.
    ///
    /// Ownership must already have been checked. Cancelling `cancel` or
    /// dropping the returned stream stops the lifecycle within one tick.
    #[must_use]
    pub fn subscribe(&self, order: Order, cancel: CancellationToken) -> StatusStream {
        let (tx, rx) = mpsc::channel(1);

        // The channel is empty, so the snapshot never waits.
        if tx.try_send(StatusEvent::from(&order)).is_err() {
            tracing::warn!(order_id = %order.id(), "Subscriber gone before first event");
            return ReceiverStream::new(rx);
        }

        if order.is_terminal() {
            tracing::debug!(order_id = %order.id(), "Order already closed");
            return ReceiverStream::new(rx);
        }

        let span = tracing::info_span!("status_stream", order_id = %order.id());
        let task = Lifecycle {
            repository: Arc::clone(&self.repository),
            tick: self.tick,
            guard: ActiveGuard::enter(Arc::clone(&self.active)),
        };
        tokio::spawn(task.run(order, tx, cancel).instrument(span));

        ReceiverStream::new(rx)
    }
}

/// Counts a running lifecycle task for as long as it is alive.
struct ActiveGuard(Arc<AtomicUsize>);

impl ActiveGuard {
    fn enter(counter: Arc<AtomicUsize>) -> Self {
        let now = counter.fetch_add(1, Ordering::Relaxed) + 1;
        metrics::set_active_subscriptions(now);
        Self(counter)
    }
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        let now = self.0.fetch_sub(1, Ordering::Relaxed).saturating_sub(1);
        metrics::set_active_subscriptions(now);
    }
}

struct Lifecycle {
    repository: Arc<dyn OrderRepository>,
    tick: Duration,
    guard: ActiveGuard,
}

impl Lifecycle {
    async fn run(
        self,
        mut order: Order,
        tx: mpsc::Sender<StatusEvent>,
        cancel: CancellationToken,
    ) {
        let _guard = self.guard;
        let mut ticker = tokio::time::interval_at(Instant::now() + self.tick, self.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    tracing::debug!("Subscription cancelled");
                    return;
                }
                () = tx.closed() => {
                    tracing::debug!("Subscriber disconnected");
                    return;
                }
                _ = ticker.tick() => {}
            }

            // The slot frees only once the previous event has been taken.
            let permit = tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    tracing::debug!("Subscription cancelled");
                    return;
                }
                permit = tx.reserve() => match permit {
                    Ok(permit) => permit,
                    Err(_) => {
                        tracing::debug!("Subscriber disconnected");
                        return;
                    }
                },
            };

            if !order.advance(Utc::now()) {
                return;
            }

            order = match self.repository.update(order.id(), order.clone()).await {
                Ok(updated) => updated,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to persist status, closing stream");
                    metrics::record_stream_persist_failure();
                    return;
                }
            };
            metrics::record_status_transition(order.status());
            tracing::debug!(status = %order.status(), "Order status advanced");
            permit.send(StatusEvent::from(&order));

            if order.is_terminal() {
                return;
            }
        }
    }
}
