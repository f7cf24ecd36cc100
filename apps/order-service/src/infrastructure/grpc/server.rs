//! gRPC Order Server Implementation
//!
//! Implements `order.v1.OrderService` on top of the application
//! [`OrderService`]. Subscriptions are tied to a child of the server's
//! shutdown token, so both client disconnect and process shutdown stop the
//! status lifecycle.

use std::pin::Pin;
use std::sync::Arc;

use tokio_stream::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;
use tonic::{Request, Response, Status};
use tracing::field;

use super::convert::{datetime_to_timestamp, parse_uuid, status_to_proto};
use super::request_id;
use super::proto::order::v1::{
    CreateOrderRequest, CreateOrderResponse, GetOrderStatusRequest, GetOrderStatusResponse,
    order_service_server::OrderService as OrderServiceRpc,
};
use crate::application::services::{CreateOrderCommand, OrderService, StatusEvent};

// =============================================================================
// Type Aliases
// =============================================================================

type RpcResult<T> = Result<Response<T>, Status>;
type BoxedStream<T> = Pin<Box<dyn Stream<Item = Result<T, Status>> + Send>>;

// =============================================================================
// Server
// =============================================================================

/// gRPC adapter for the order service.
#[derive(Clone)]
pub struct OrderGrpcService {
    service: Arc<OrderService>,
    shutdown: CancellationToken,
}

impl OrderGrpcService {
    /// Create the adapter. Cancelling `shutdown` ends every open subscription.
    #[must_use]
    pub const fn new(service: Arc<OrderService>, shutdown: CancellationToken) -> Self {
        Self { service, shutdown }
    }
}

#[tonic::async_trait]
impl OrderServiceRpc for OrderGrpcService {
    type SubscribeOrderStatusStream = BoxedStream<GetOrderStatusResponse>;

    #[tracing::instrument(skip_all, fields(request_id = field::Empty))]
    async fn create_order(&self, request: Request<CreateOrderRequest>) -> RpcResult<CreateOrderResponse> {
        let id = record_request_id(&request);
        request_id::scope(id, self.create(request.into_inner())).await
    }

    #[tracing::instrument(skip_all, fields(request_id = field::Empty))]
    async fn get_order_status(
        &self,
        request: Request<GetOrderStatusRequest>,
    ) -> RpcResult<GetOrderStatusResponse> {
        record_request_id(&request);
        let req = request.into_inner();
        let user_id = parse_uuid("user_id", &req.user_id)?;
        let order_id = parse_uuid("order_id", &req.order_id)?;

        let event = self.service.get_order_status(user_id, order_id).await?;
        Ok(Response::new(event_to_response(&event)))
    }

    #[tracing::instrument(skip_all, fields(request_id = field::Empty))]
    async fn subscribe_order_status(
        &self,
        request: Request<GetOrderStatusRequest>,
    ) -> RpcResult<Self::SubscribeOrderStatusStream> {
        record_request_id(&request);
        let req = request.into_inner();
        let user_id = parse_uuid("user_id", &req.user_id)?;
        let order_id = parse_uuid("order_id", &req.order_id)?;

        let cancel = self.shutdown.child_token();
        let events = self
            .service
            .subscribe_order_status(user_id, order_id, cancel.clone())
            .await?;

        // Cancelled when tonic drops the response stream.
        let guard = cancel.drop_guard();
        let stream = events.map(move |event| {
            let _guard = &guard;
            Ok(event_to_response(&event))
        });

        Ok(Response::new(Box::pin(stream) as Self::SubscribeOrderStatusStream))
    }
}

impl OrderGrpcService {
    async fn create(&self, req: CreateOrderRequest) -> RpcResult<CreateOrderResponse> {
        let command = CreateOrderCommand {
            user_id: parse_uuid("user_id", &req.user_id)?,
            market_id: parse_uuid("market_id", &req.market_id)?,
            order_type: req.order_type,
            price: req.price,
            quantity: req.quantity,
            user_roles: req.user_roles,
        };

        let created = self.service.create_order(command).await?;

        Ok(Response::new(CreateOrderResponse {
            id: created.id.to_string(),
            status: status_to_proto(created.status).into(),
        }))
    }
}

// =============================================================================
// Conversion Functions
// =============================================================================

fn event_to_response(event: &StatusEvent) -> GetOrderStatusResponse {
    GetOrderStatusResponse {
        status: status_to_proto(event.status).into(),
        updated_at: Some(datetime_to_timestamp(event.updated_at)),
    }
}

/// Resolve the call's request id and record it on the current span.
fn record_request_id<T>(request: &Request<T>) -> String {
    let id = request_id::from_metadata(request.metadata());
    tracing::Span::current().record("request_id", id.as_str());
    id
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::MockMarketDirectory;
    use crate::application::services::OrderServiceConfig;
    use crate::domain::{Market, OrderStatus};
    use crate::infrastructure::cache::InMemoryMarketCache;
    use crate::infrastructure::grpc::proto::order::v1::OrderStatus as WireStatus;
    use crate::infrastructure::persistence::InMemoryOrderRepository;
    use crate::infrastructure::users::InMemoryUserDirectory;
    use chrono::Utc;
    use tonic::Code;
    use tonic::metadata::MetadataValue;
    use uuid::Uuid;

    const GLEB: &str = "1179803e-06f0-4369-b94f-14e26ec190a3";
    const VOVA: &str = "3179803e-06f0-4369-b94f-14e26ec190a3";

    fn grpc_service(shutdown: CancellationToken) -> OrderGrpcService {
        let mut directory = MockMarketDirectory::new();
        directory
            .expect_view_markets_by_roles()
            .returning(|_| Ok(vec![Market::new(Uuid::new_v4(), "BTC-USDT")]));

        let service = OrderService::new(
            Arc::new(InMemoryOrderRepository::new()),
            Arc::new(InMemoryUserDirectory::seeded()),
            Arc::new(InMemoryMarketCache::new()),
            Arc::new(directory),
            OrderServiceConfig::default(),
        );
        OrderGrpcService::new(Arc::new(service), shutdown)
    }

    fn create_request(user: &str) -> CreateOrderRequest {
        CreateOrderRequest {
            user_id: user.to_string(),
            market_id: Uuid::new_v4().to_string(),
            order_type: "buy".to_string(),
            price: "250.00".to_string(),
            quantity: 4,
            user_roles: vec!["USER_ROLE_TRADER".to_string()],
        }
    }

    async fn create(svc: &OrderGrpcService, user: &str) -> String {
        svc.create_order(Request::new(create_request(user)))
            .await
            .unwrap()
            .into_inner()
            .id
    }

    #[tokio::test]
    async fn create_then_get_status() {
        let svc = grpc_service(CancellationToken::new());
        let order_id = create(&svc, GLEB).await;

        let response = svc
            .get_order_status(Request::new(GetOrderStatusRequest {
                user_id: GLEB.to_string(),
                order_id,
            }))
            .await
            .unwrap()
            .into_inner();

        assert_eq!(response.status, i32::from(WireStatus::Created));
        assert!(response.updated_at.is_some());
    }

    #[tokio::test]
    async fn malformed_ids_are_invalid_argument() {
        let svc = grpc_service(CancellationToken::new());

        let mut req = create_request(GLEB);
        req.market_id = "nope".to_string();
        let status = svc.create_order(Request::new(req)).await.unwrap_err();
        assert_eq!(status.code(), Code::InvalidArgument);

        let status = svc
            .get_order_status(Request::new(GetOrderStatusRequest {
                user_id: GLEB.to_string(),
                order_id: "12345".to_string(),
            }))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::InvalidArgument);
    }

    #[tokio::test]
    async fn other_users_order_is_permission_denied() {
        let svc = grpc_service(CancellationToken::new());
        let order_id = create(&svc, GLEB).await;

        let status = svc
            .subscribe_order_status(Request::new(GetOrderStatusRequest {
                user_id: VOVA.to_string(),
                order_id,
            }))
            .await
            .err()
            .unwrap();
        assert_eq!(status.code(), Code::PermissionDenied);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_ends_subscription() {
        let shutdown = CancellationToken::new();
        let svc = grpc_service(shutdown.clone());
        let order_id = create(&svc, GLEB).await;

        let mut stream = svc
            .subscribe_order_status(Request::new(GetOrderStatusRequest {
                user_id: GLEB.to_string(),
                order_id,
            }))
            .await
            .unwrap()
            .into_inner();

        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.status, i32::from(WireStatus::Created));

        shutdown.cancel();
        let rest: Vec<_> = stream.collect().await;
        assert!(rest.len() <= 1);
    }

    #[tokio::test]
    async fn create_forwards_request_id_upstream() {
        let mut directory = MockMarketDirectory::new();
        directory.expect_view_markets_by_roles().returning(|_| {
            assert_eq!(request_id::current().as_deref(), Some("req-99"));
            Ok(vec![Market::new(Uuid::new_v4(), "BTC-USDT")])
        });
        let service = OrderService::new(
            Arc::new(InMemoryOrderRepository::new()),
            Arc::new(InMemoryUserDirectory::seeded()),
            Arc::new(InMemoryMarketCache::new()),
            Arc::new(directory),
            OrderServiceConfig::default(),
        );
        let svc = OrderGrpcService::new(Arc::new(service), CancellationToken::new());

        let mut request = Request::new(create_request(GLEB));
        request
            .metadata_mut()
            .insert(request_id::REQUEST_ID_HEADER, MetadataValue::from_static("req-99"));
        svc.create_order(request).await.unwrap();
    }

    #[test]
    fn event_maps_status_and_time() {
        let now = Utc::now();
        let response = event_to_response(&StatusEvent {
            order_id: Uuid::new_v4(),
            status: OrderStatus::Delivered,
            updated_at: now,
        });
        assert_eq!(response.status, i32::from(WireStatus::Delivered));
        assert_eq!(response.updated_at.unwrap().seconds, now.timestamp());
    }
}
