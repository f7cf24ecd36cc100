//! Rich error handling for the order service.
//!
//! Every component returns an [`OrderError`] carrying an [`ErrorCode`]. Codes
//! group into five kinds, and each kind maps to one gRPC status code:
//!
//! | Kind | gRPC code | Examples |
//! |------|-----------|----------|
//! | `InvalidArgument` | `INVALID_ARGUMENT` (3) | Malformed id, bad price, no roles |
//! | `NotFound` | `NOT_FOUND` (5) | Unknown order, user or market |
//! | `PermissionDenied` | `PERMISSION_DENIED` (7) | Role or ownership mismatch |
//! | `Unavailable` | `UNAVAILABLE` (14) | Cache, store or upstream unreachable |
//! | `Internal` | `INTERNAL` (13) | Serialization or unexpected failure |
//!
//! Statuses carry `tonic-types` rich details (`ErrorInfo`, plus `BadRequest`
//! for invalid arguments). Messages are human readable; transport error text
//! stays in logs.

use std::collections::HashMap;

use thiserror::Error;
use tonic::Code;
use tonic_types::{ErrorDetails, StatusExt};

/// Domain for order service errors.
pub const ERROR_DOMAIN: &str = "order.service";

/// Coarse error classification shared by all components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed input.
    InvalidArgument,
    /// Order, user or market absent.
    NotFound,
    /// Role or ownership mismatch.
    PermissionDenied,
    /// A dependency is transiently unreachable.
    Unavailable,
    /// Serialization or unexpected failure.
    Internal,
}

impl ErrorKind {
    /// gRPC status code for this kind.
    #[must_use]
    pub const fn grpc_code(self) -> Code {
        match self {
            Self::InvalidArgument => Code::InvalidArgument,
            Self::NotFound => Code::NotFound,
            Self::PermissionDenied => Code::PermissionDenied,
            Self::Unavailable => Code::Unavailable,
            Self::Internal => Code::Internal,
        }
    }
}

/// Specific error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Malformed request field.
    InvalidArgument,
    /// Order does not exist.
    OrderNotFound,
    /// User does not exist.
    UserNotFound,
    /// No market is available for the user's roles.
    MarketNotFound,
    /// User's roles do not intersect the claimed roles.
    NoMarketAccess,
    /// Caller does not own the order.
    InvalidUserId,
    /// Market cache unreachable.
    CacheUnavailable,
    /// Market directory unreachable.
    UpstreamUnavailable,
    /// Order store unreachable.
    StoreUnavailable,
    /// Cached payload could not be (de)serialized.
    SerializationFailed,
    /// Unexpected failure.
    Internal,
}

impl ErrorCode {
    /// The kind this code belongs to.
    #[must_use]
    pub const fn kind(self) -> ErrorKind {
        match self {
            Self::InvalidArgument => ErrorKind::InvalidArgument,
            Self::OrderNotFound | Self::UserNotFound | Self::MarketNotFound => ErrorKind::NotFound,
            Self::NoMarketAccess | Self::InvalidUserId => ErrorKind::PermissionDenied,
            Self::CacheUnavailable | Self::UpstreamUnavailable | Self::StoreUnavailable => {
                ErrorKind::Unavailable
            }
            Self::SerializationFailed | Self::Internal => ErrorKind::Internal,
        }
    }

    /// gRPC status code for this error.
    #[must_use]
    pub const fn grpc_code(self) -> Code {
        self.kind().grpc_code()
    }

    /// Error reason string (for gRPC `ErrorInfo`).
    #[must_use]
    pub const fn reason(self) -> &'static str {
        match self {
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::OrderNotFound => "ORDER_NOT_FOUND",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::MarketNotFound => "MARKET_NOT_FOUND",
            Self::NoMarketAccess => "NO_MARKET_ACCESS",
            Self::InvalidUserId => "INVALID_USER_ID",
            Self::CacheUnavailable => "CACHE_UNAVAILABLE",
            Self::UpstreamUnavailable => "UPSTREAM_UNAVAILABLE",
            Self::StoreUnavailable => "STORE_UNAVAILABLE",
            Self::SerializationFailed => "SERIALIZATION_FAILED",
            Self::Internal => "INTERNAL_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.reason())
    }
}

/// An error with a code, a message and key-value context.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[{}] {}", .code.reason(), .message)]
pub struct OrderError {
    code: ErrorCode,
    message: String,
    context: Vec<(String, String)>,
}

impl OrderError {
    /// Create a new error.
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: Vec::new(),
        }
    }

    /// Add context to the error.
    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.push((key.into(), value.into()));
        self
    }

    /// Error code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    /// Error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.code.kind()
    }

    /// Human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Attached context.
    #[must_use]
    pub fn context(&self) -> &[(String, String)] {
        &self.context
    }

    /// Convert to a tonic Status with rich error details.
    #[must_use]
    pub fn to_status(&self) -> tonic::Status {
        let mut details = ErrorDetails::new();

        let metadata: HashMap<String, String> = self.context.iter().cloned().collect();
        details.set_error_info(self.code.reason(), ERROR_DOMAIN, metadata);

        if self.kind() == ErrorKind::InvalidArgument {
            let field = self
                .context
                .iter()
                .find(|(k, _)| k == "field")
                .map_or("request", |(_, v)| v.as_str());
            details.add_bad_request_violation(field, &self.message);
        }

        tonic::Status::with_error_details(self.code.grpc_code(), &self.message, details)
    }
}

impl From<OrderError> for tonic::Status {
    fn from(err: OrderError) -> Self {
        err.to_status()
    }
}

/// Convenience constructors for common errors.
impl OrderError {
    /// Malformed request field.
    #[must_use]
    pub fn invalid_argument(field: &str, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidArgument, message).with_context("field", field)
    }

    /// Order not found.
    #[must_use]
    pub fn order_not_found(order_id: &str) -> Self {
        Self::new(ErrorCode::OrderNotFound, "order not found").with_context("order_id", order_id)
    }

    /// User not found.
    #[must_use]
    pub fn user_not_found(user_id: &str) -> Self {
        Self::new(ErrorCode::UserNotFound, "user not found").with_context("user_id", user_id)
    }

    /// No market available for the user.
    #[must_use]
    pub fn market_not_found(user_id: &str) -> Self {
        Self::new(ErrorCode::MarketNotFound, "market not found").with_context("user_id", user_id)
    }

    /// Claimed roles do not grant market access.
    #[must_use]
    pub fn no_market_access(user_id: &str) -> Self {
        Self::new(ErrorCode::NoMarketAccess, "user has no access to market")
            .with_context("user_id", user_id)
    }

    /// Caller does not own the order.
    #[must_use]
    pub fn invalid_user_id(user_id: &str, order_id: &str) -> Self {
        Self::new(ErrorCode::InvalidUserId, "invalid user id")
            .with_context("user_id", user_id)
            .with_context("order_id", order_id)
    }

    /// Cache unreachable.
    #[must_use]
    pub fn cache_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::CacheUnavailable, message)
    }

    /// Market directory unreachable.
    #[must_use]
    pub fn upstream_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::UpstreamUnavailable, message)
    }

    /// Order store unreachable.
    #[must_use]
    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StoreUnavailable, message)
    }

    /// Cached payload could not be (de)serialized.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::SerializationFailed, message)
    }

    /// Unexpected failure.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message)
    }
}
