//! Health Check and Metrics Endpoint
//!
//! HTTP endpoint for health checks and Prometheus metrics, served on a
//! separate port from gRPC.
//!
//! # Endpoints
//!
//! - `GET /health` - JSON health status
//! - `GET /healthz` - Liveness probe (simple OK)
//! - `GET /readyz` - Readiness probe (pings the market cache)
//! - `GET /metrics` - Prometheus metrics in text format

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::application::services::OrderService;
use crate::infrastructure::metrics::get_metrics_handle;

// =============================================================================
// Health Response Types
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: HealthStatus,
    /// Service version.
    pub version: String,
    /// Server uptime in seconds.
    pub uptime_secs: u64,
    /// Current time.
    pub current_time: DateTime<Utc>,
    /// Market cache status.
    pub cache: CacheStatus,
    /// Running status subscriptions.
    pub active_subscriptions: usize,
    /// Stored orders, when the store can report it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orders: Option<usize>,
}

/// Overall health status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// All dependencies reachable.
    Healthy,
    /// The market cache is unreachable; creates will fail.
    Degraded,
}

/// Market cache status.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatus {
    /// Backend name.
    pub backend: &'static str,
    /// Whether the last ping succeeded.
    pub reachable: bool,
}

// =============================================================================
// Health Server State
// =============================================================================

/// Shared state for the health server.
pub struct HealthServerState {
    version: String,
    started_at: Instant,
    service: Arc<OrderService>,
}

impl HealthServerState {
    /// Create new health server state.
    #[must_use]
    pub fn new(version: impl Into<String>, service: Arc<OrderService>) -> Self {
        Self {
            version: version.into(),
            started_at: Instant::now(),
            service,
        }
    }
}

// =============================================================================
// Health Server
// =============================================================================

/// Health check HTTP server.
pub struct HealthServer {
    port: u16,
    state: Arc<HealthServerState>,
    cancel: CancellationToken,
}

impl HealthServer {
    /// Create a new health server.
    #[must_use]
    pub const fn new(port: u16, state: Arc<HealthServerState>, cancel: CancellationToken) -> Self {
        Self {
            port,
            state,
            cancel,
        }
    }

    /// Run the health server until cancelled.
    ///
    /// # Errors
    ///
    /// Returns `HealthServerError` if binding fails or the HTTP server
    /// encounters a fatal error while running.
    pub async fn run(self) -> Result<(), HealthServerError> {
        let app = router(self.state);

        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| HealthServerError::BindFailed(self.port, e.to_string()))?;

        tracing::info!(port = self.port, "Health server listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(self.cancel.cancelled_owned())
            .await
            .map_err(|e| HealthServerError::ServerFailed(e.to_string()))?;

        tracing::info!("Health server stopped");
        Ok(())
    }
}

/// Routes served by the health server.
pub fn router(state: Arc<HealthServerState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/healthz", get(liveness_handler))
        .route("/readyz", get(readiness_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

// =============================================================================
// HTTP Handlers
// =============================================================================

async fn health_handler(State(state): State<Arc<HealthServerState>>) -> impl IntoResponse {
    Json(build_health_response(&state).await)
}

async fn liveness_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn readiness_handler(State(state): State<Arc<HealthServerState>>) -> impl IntoResponse {
    match state.service.market_cache().ping().await {
        Ok(()) => (StatusCode::OK, "READY"),
        Err(e) => {
            tracing::warn!(error = %e, "Market cache ping failed");
            (StatusCode::SERVICE_UNAVAILABLE, "NOT READY")
        }
    }
}

async fn metrics_handler() -> impl IntoResponse {
    get_metrics_handle().map_or_else(
        || {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                [("content-type", "text/plain")],
                "Metrics not initialized".to_string(),
            )
        },
        |handle| {
            (
                StatusCode::OK,
                [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
                handle.render(),
            )
        },
    )
}

async fn build_health_response(state: &HealthServerState) -> HealthResponse {
    let cache = state.service.market_cache();
    let reachable = cache.ping().await.is_ok();

    HealthResponse {
        status: if reachable {
            HealthStatus::Healthy
        } else {
            HealthStatus::Degraded
        },
        version: state.version.clone(),
        uptime_secs: state.started_at.elapsed().as_secs(),
        current_time: Utc::now(),
        cache: CacheStatus {
            backend: cache.backend(),
            reachable,
        },
        active_subscriptions: state.service.active_subscriptions(),
        orders: state.service.orders().count().await,
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Health server errors.
#[derive(Debug, thiserror::Error)]
pub enum HealthServerError {
    /// Failed to bind to port.
    #[error("failed to bind to port {0}: {1}")]
    BindFailed(u16, String),

    /// Server error.
    #[error("server error: {0}")]
    ServerFailed(String),
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{MarketCache, MockMarketCache, MockMarketDirectory};
    use crate::application::services::OrderServiceConfig;
    use crate::error::OrderError;
    use crate::infrastructure::cache::InMemoryMarketCache;
    use crate::infrastructure::persistence::InMemoryOrderRepository;
    use crate::infrastructure::users::InMemoryUserDirectory;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn state_with(cache: Arc<dyn MarketCache>) -> Arc<HealthServerState> {
        let service = OrderService::new(
            Arc::new(InMemoryOrderRepository::new()),
            Arc::new(InMemoryUserDirectory::seeded()),
            cache,
            Arc::new(MockMarketDirectory::new()),
            OrderServiceConfig::default(),
        );
        Arc::new(HealthServerState::new("0.1.0", Arc::new(service)))
    }

    fn down_cache() -> MockMarketCache {
        let mut cache = MockMarketCache::new();
        cache
            .expect_ping()
            .returning(|| Err(OrderError::cache_unavailable("connection refused")));
        cache.expect_backend().return_const("redis");
        cache
    }

    async fn get(state: Arc<HealthServerState>, path: &str) -> (StatusCode, String) {
        let response = router(state)
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[test]
    fn health_status_serialization() {
        assert_eq!(
            serde_json::to_string(&HealthStatus::Healthy).unwrap(),
            "\"healthy\""
        );
        assert_eq!(
            serde_json::to_string(&HealthStatus::Degraded).unwrap(),
            "\"degraded\""
        );
    }

    #[tokio::test]
    async fn liveness_is_ok() {
        let (status, body) = get(state_with(Arc::new(InMemoryMarketCache::new())), "/healthz").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "OK");
    }

    #[tokio::test]
    async fn ready_when_cache_answers() {
        let (status, body) = get(state_with(Arc::new(InMemoryMarketCache::new())), "/readyz").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "READY");
    }

    #[tokio::test]
    async fn not_ready_when_cache_is_down() {
        let (status, _) = get(state_with(Arc::new(down_cache())), "/readyz").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn health_reports_cache_and_store() {
        let (status, body) = get(state_with(Arc::new(InMemoryMarketCache::new())), "/health").await;
        assert_eq!(status, StatusCode::OK);

        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["cache"]["backend"], "memory");
        assert_eq!(json["orders"], 0);
        assert_eq!(json["active_subscriptions"], 0);
    }

    #[tokio::test]
    async fn health_is_degraded_when_cache_is_down() {
        let (_, body) = get(state_with(Arc::new(down_cache())), "/health").await;
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["status"], "degraded");
        assert_eq!(json["cache"]["reachable"], false);
    }
}
