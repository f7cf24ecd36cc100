//! Spot Instrument Market Directory
//!
//! `MarketDirectory` adapter over the upstream `spot.v1.MarketService`.
//! Every outbound call carries an `x-request-id` header: the id of the call
//! being served when there is one, otherwise a fresh one.

use std::time::Duration;

use async_trait::async_trait;
use tonic::metadata::MetadataValue;
use tonic::service::Interceptor;
use tonic::service::interceptor::InterceptedService;
use tonic::transport::{Channel, Endpoint};
use tonic::{Request, Status};
use uuid::Uuid;

use crate::application::ports::MarketDirectory;
use crate::domain::Market;
use crate::error::OrderError;
use crate::infrastructure::grpc::request_id::{self, REQUEST_ID_HEADER};
use crate::infrastructure::grpc::convert::market_from_proto;
use crate::infrastructure::grpc::proto::spot::v1::ViewMarketsRequest;
use crate::infrastructure::grpc::proto::spot::v1::market_service_client::MarketServiceClient;

/// Stamps outbound requests with the current request id, or a fresh one
/// outside a served call. An explicitly set header is left alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestIdInterceptor;

impl Interceptor for RequestIdInterceptor {
    fn call(&mut self, mut request: Request<()>) -> Result<Request<()>, Status> {
        if !request.metadata().contains_key(REQUEST_ID_HEADER) {
            let id = request_id::current().unwrap_or_else(|| Uuid::new_v4().to_string());
            let value = MetadataValue::try_from(id.as_str())
                .map_err(|e| Status::internal(format!("invalid request id: {e}")))?;
            request.metadata_mut().insert(REQUEST_ID_HEADER, value);
        }
        Ok(request)
    }
}

type Client = MarketServiceClient<InterceptedService<Channel, RequestIdInterceptor>>;

/// Upstream client settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketDirectoryConfig {
    /// `http://host:port` of the spot instrument service.
    pub endpoint: String,
    /// Connection establishment timeout.
    pub connect_timeout: Duration,
}

/// `MarketDirectory` backed by the spot instrument gRPC service.
#[derive(Clone)]
pub struct GrpcMarketDirectory {
    client: Client,
}

impl GrpcMarketDirectory {
    /// Build a lazily connecting client; the first call dials the upstream.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the endpoint is not a valid URI.
    pub fn connect_lazy(config: &MarketDirectoryConfig) -> Result<Self, OrderError> {
        let endpoint = Endpoint::from_shared(config.endpoint.clone())
            .map_err(|e| {
                OrderError::invalid_argument("endpoint", format!("invalid endpoint: {e}"))
            })?
            .connect_timeout(config.connect_timeout)
            .tcp_nodelay(true);

        tracing::debug!(endpoint = %config.endpoint, "Created lazy connection to market directory");
        Ok(Self::from_channel(endpoint.connect_lazy()))
    }

    /// Wrap an existing channel.
    #[must_use]
    pub fn from_channel(channel: Channel) -> Self {
        Self {
            client: MarketServiceClient::with_interceptor(channel, RequestIdInterceptor),
        }
    }
}

#[async_trait]
impl MarketDirectory for GrpcMarketDirectory {
    #[tracing::instrument(skip(self), fields(roles = roles.len()))]
    async fn view_markets_by_roles(&self, roles: Vec<String>) -> Result<Vec<Market>, OrderError> {
        let mut client = self.client.clone();
        let response = client
            .view_markets_by_roles(ViewMarketsRequest { user_roles: roles })
            .await
            .map_err(|status| {
                tracing::error!(code = ?status.code(), message = status.message(), "Market directory call failed");
                OrderError::upstream_unavailable("spot instrument service is unavailable")
            })?;

        let markets = response
            .into_inner()
            .markets
            .into_iter()
            .map(market_from_proto)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(count = markets.len(), "Markets received");
        Ok(markets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn interceptor_adds_request_id() {
        let request = RequestIdInterceptor.call(Request::new(())).unwrap();
        let value = request.metadata().get(REQUEST_ID_HEADER).unwrap();
        assert!(Uuid::parse_str(value.to_str().unwrap()).is_ok());
    }

    #[tokio::test]
    async fn interceptor_forwards_current_request_id() {
        let request = request_id::scope("req-7".to_string(), async {
            RequestIdInterceptor.call(Request::new(())).unwrap()
        })
        .await;
        assert_eq!(
            request.metadata().get(REQUEST_ID_HEADER).unwrap().to_str().unwrap(),
            "req-7"
        );
    }

    #[test]
    fn interceptor_keeps_existing_request_id() {
        let mut request = Request::new(());
        request
            .metadata_mut()
            .insert(REQUEST_ID_HEADER, MetadataValue::from_static("req-42"));
        let request = RequestIdInterceptor.call(request).unwrap();
        assert_eq!(
            request.metadata().get(REQUEST_ID_HEADER).unwrap().to_str().unwrap(),
            "req-42"
        );
    }

    #[tokio::test]
    async fn invalid_endpoint_is_rejected() {
        let err = GrpcMarketDirectory::connect_lazy(&MarketDirectoryConfig {
            endpoint: "not a uri".to_string(),
            connect_timeout: Duration::from_secs(1),
        })
        .err()
        .unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[tokio::test]
    async fn unreachable_upstream_is_unavailable() {
        let directory = GrpcMarketDirectory::connect_lazy(&MarketDirectoryConfig {
            endpoint: "http://127.0.0.1:1".to_string(),
            connect_timeout: Duration::from_millis(200),
        })
        .unwrap();
        let err = directory
            .view_markets_by_roles(vec!["USER_ROLE_TRADER".to_string()])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unavailable);
    }
}
