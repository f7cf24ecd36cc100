//! gRPC Surface
//!
//! Generated `order.v1` and `spot.v1` bindings, the `OrderService` server,
//! and conversions between wire and domain types.
//!
//! Each RPC validates its identifiers, delegates to the application
//! [`OrderService`](crate::application::services::OrderService), and maps
//! [`OrderError`](crate::error::OrderError) to a rich `tonic::Status`.

pub mod convert;
pub mod request_id;
pub mod server;
pub mod shutdown;

// Allow clippy warnings and missing docs in generated code
#[allow(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used
)]
pub mod proto {
    pub mod order {
        pub mod v1 {
            include!(concat!(
                env!("CARGO_MANIFEST_DIR"),
                "/../../packages/schema-gen/rust/order/v1/order.v1.rs"
            ));
            include!(concat!(
                env!("CARGO_MANIFEST_DIR"),
                "/../../packages/schema-gen/rust/order/v1/order.v1.tonic.rs"
            ));
        }
    }

    pub mod spot {
        pub mod v1 {
            include!(concat!(
                env!("CARGO_MANIFEST_DIR"),
                "/../../packages/schema-gen/rust/spot/v1/spot.v1.rs"
            ));
            include!(concat!(
                env!("CARGO_MANIFEST_DIR"),
                "/../../packages/schema-gen/rust/spot/v1/spot.v1.tonic.rs"
            ));
        }
    }
}

pub use request_id::REQUEST_ID_HEADER;
pub use server::OrderGrpcService;
pub use shutdown::{ServerExit, serve_until_drained};
