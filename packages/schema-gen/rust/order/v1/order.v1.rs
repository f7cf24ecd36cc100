// @generated
// This file is @generated by prost-build.
#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct CreateOrderRequest {
    #[prost(string, tag = "1")]
    pub user_id: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub market_id: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub order_type: ::prost::alloc::string::String,
    /// Exact decimal, e.g. "101.25".
    #[prost(string, tag = "4")]
    pub price: ::prost::alloc::string::String,
    #[prost(int64, tag = "5")]
    pub quantity: i64,
    #[prost(string, repeated, tag = "6")]
    pub user_roles: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
}
#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct CreateOrderResponse {
    #[prost(string, tag = "1")]
    pub id: ::prost::alloc::string::String,
    #[prost(enumeration = "OrderStatus", tag = "2")]
    pub status: i32,
}
#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct GetOrderStatusRequest {
    #[prost(string, tag = "1")]
    pub user_id: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub order_id: ::prost::alloc::string::String,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetOrderStatusResponse {
    #[prost(enumeration = "OrderStatus", tag = "1")]
    pub status: i32,
    #[prost(message, optional, tag = "2")]
    pub updated_at: ::core::option::Option<::prost_types::Timestamp>,
}
/// Lifecycle of an order. Values advance strictly forward, one position at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum OrderStatus {
    Unspecified = 0,
    Created = 1,
    Pending = 2,
    WaitSeller = 3,
    Paid = 4,
    OnHold = 5,
    Processing = 6,
    Packed = 7,
    OutOfDelivery = 8,
    OnTheWay = 9,
    Delivered = 10,
    Closed = 11,
}
impl OrderStatus {
    /// String value of the enum field names used in the ProtoBuf definition.
    ///
    /// The values are not transformed in any way and thus are considered stable
    /// (if the ProtoBuf definition does not change) and safe for programmatic use.
    pub fn as_str_name(&self) -> &'static str {
        match self {
            Self::Unspecified => "ORDER_STATUS_UNSPECIFIED",
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
    /// Creates an enum from field names used in the ProtoBuf definition.
    pub fn from_str_name(value: &str) -> ::core::option::Option<Self> {
        match value {
            "ORDER_STATUS_UNSPECIFIED" => Some(Self::Unspecified),
            "ORDER_STATUS_CREATED" => Some(Self::Created),
            "ORDER_STATUS_PENDING" => Some(Self::Pending),
            "ORDER_STATUS_WAIT_SELLER" => Some(Self::WaitSeller),
            "ORDER_STATUS_PAID" => Some(Self::Paid),
            "ORDER_STATUS_ON_HOLD" => Some(Self::OnHold),
            "ORDER_STATUS_PROCESSING" => Some(Self::Processing),
            "ORDER_STATUS_PACKED" => Some(Self::Packed),
            "ORDER_STATUS_OUT_OF_DELIVERY" => Some(Self::OutOfDelivery),
            "ORDER_STATUS_ON_THE_WAY" => Some(Self::OnTheWay),
            "ORDER_STATUS_DELIVERED" => Some(Self::Delivered),
            "ORDER_STATUS_CLOSED" => Some(Self::Closed),
            _ => None,
        }
    }
}
