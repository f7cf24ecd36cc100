//! Order Service Binary
//!
//! Starts the order gRPC service and its health server.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin order-service
//! ```
//!
//! # Environment Variables
//!
//! ## Required
//! - `GRPC_API_SPOT_INSTRUMENT_SERVICE_HOST`: Spot instrument service endpoint
//!
//! ## Optional
//! - `GRPC_SERVER_ADDRESS`: gRPC listen address (default: 0.0.0.0:50051)
//! - `GRPC_SERVER_TLS_CERT_FILE` / `GRPC_SERVER_TLS_KEY_FILE`: Serve over TLS
//! - `HEALTH_PORT`: Health check HTTP port (default: 8083)
//! - `REDIS_HOST`, `REDIS_PORT`, `REDIS_PASSWORD`, `REDIS_DB`: Market cache
//! - `ORDER_STORE`: memory | postgres (default: memory)
//! - `MARKET_CACHE_TTL_SECS`: Market authorization TTL (default: 300)
//! - `ORDER_STATUS_TICK_SECS`: Status lifecycle tick (default: 5)
//! - `OTEL_ENABLED`, `OTEL_EXPORTER_OTLP_ENDPOINT`, `OTEL_SERVICE_NAME`
//! - `RUST_LOG`: Log level (default: info)

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use order_service::application::ports::{MarketCache, OrderRepository};
use order_service::infrastructure::config::{OrderStoreSettings, ServiceConfig};
use order_service::infrastructure::grpc::proto::order::v1::order_service_server::OrderServiceServer;
use order_service::infrastructure::grpc::serve_until_drained;
use order_service::infrastructure::health::{HealthServer, HealthServerState};
use order_service::infrastructure::telemetry;
use order_service::{
    GrpcMarketDirectory, InMemoryMarketCache, InMemoryOrderRepository, InMemoryUserDirectory,
    OrderGrpcService, OrderService, RedisMarketCache, init_metrics,
};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tonic::transport::Server;

/// Upper bound on draining in-flight calls after a shutdown signal.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("failed to install rustls crypto provider"))?;

    load_dotenv();

    let _telemetry_guard = telemetry::init()?;

    tracing::info!("Starting Order Service");

    let _metrics_handle = init_metrics().context("failed to install Prometheus recorder")?;

    let config = ServiceConfig::from_env()?;
    log_config(&config);

    let shutdown_token = CancellationToken::new();

    let orders = build_order_store(&config.store).await?;
    let market_cache: Arc<dyn MarketCache> = match &config.redis {
        Some(settings) => Arc::new(RedisMarketCache::connect(settings).await?),
        None => Arc::new(InMemoryMarketCache::new()),
    };
    let market_directory = Arc::new(GrpcMarketDirectory::connect_lazy(&config.market_directory)?);

    let service = Arc::new(OrderService::new(
        orders,
        Arc::new(InMemoryUserDirectory::seeded()),
        market_cache,
        market_directory,
        config.orders,
    ));

    // Spawn health server
    let health_state = Arc::new(HealthServerState::new(
        env!("CARGO_PKG_VERSION"),
        Arc::clone(&service),
    ));
    let health_server = HealthServer::new(
        config.server.health_port,
        health_state,
        shutdown_token.clone(),
    );
    tokio::spawn(async move {
        if let Err(e) = health_server.run().await {
            tracing::error!(error = %e, "Health server error");
        }
    });

    let mut grpc_service =
        OrderServiceServer::new(OrderGrpcService::new(service, shutdown_token.clone()));
    if let Some(limit) = config.server.max_recv_msg_size {
        grpc_service = grpc_service.max_decoding_message_size(limit);
    }
    if let Some(limit) = config.server.max_send_msg_size {
        grpc_service = grpc_service.max_encoding_message_size(limit);
    }

    let mut builder = Server::builder();
    if let Some(tls) = &config.server.tls {
        builder = builder
            .tls_config(tls.load()?)
            .context("invalid gRPC TLS configuration")?;
    }

    tokio::spawn(await_shutdown(shutdown_token.clone()));

    let addr = config.server.address;
    tracing::info!(addr = %addr, tls = config.server.tls.is_some(), "gRPC server listening");
    let server = builder
        .add_service(grpc_service)
        .serve_with_shutdown(addr, shutdown_token.clone().cancelled_owned());
    serve_until_drained(server, shutdown_token, SHUTDOWN_TIMEOUT)
        .await
        .context("gRPC server error")?;

    tracing::info!("Order service stopped");
    Ok(())
}

async fn build_order_store(settings: &OrderStoreSettings) -> anyhow::Result<Arc<dyn OrderRepository>> {
    match settings {
        OrderStoreSettings::Memory => Ok(Arc::new(InMemoryOrderRepository::new())),
        #[cfg(feature = "postgres")]
        OrderStoreSettings::Postgres(pg) => Ok(Arc::new(
            order_service::PostgresOrderRepository::connect(&pg.url(), pg.max_connections).await?,
        )),
        #[cfg(not(feature = "postgres"))]
        OrderStoreSettings::Postgres(_) => {
            anyhow::bail!("ORDER_STORE=postgres requires building with the `postgres` feature")
        }
    }
}

/// Log the parsed configuration.
fn log_config(config: &ServiceConfig) {
    let store = match config.store {
        OrderStoreSettings::Memory => "memory",
        OrderStoreSettings::Postgres(_) => "postgres",
    };
    tracing::info!(
        grpc_addr = %config.server.address,
        health_port = config.server.health_port,
        upstream = %config.market_directory.endpoint,
        cache = if config.redis.is_some() { "redis" } else { "memory" },
        store,
        status_tick_secs = config.orders.status_tick.as_secs(),
        market_cache_ttl_secs = config.orders.market_cache_ttl.as_secs(),
        "Configuration loaded"
    );
}

/// Load .env file from current directory or any ancestor directory.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

/// Wait for shutdown signal (SIGTERM or SIGINT), then cancel the root token.
///
/// Subscription tokens are children of the root, so open streams end too.
#[allow(clippy::expect_used)]
async fn await_shutdown(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("signal handler installation is critical for graceful shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation is critical for graceful shutdown")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }

    shutdown_token.cancel();

    tracing::info!(
        timeout_secs = SHUTDOWN_TIMEOUT.as_secs(),
        "Graceful shutdown started"
    );
}
