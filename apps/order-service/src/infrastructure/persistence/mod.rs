//! Order Persistence
//!
//! `OrderRepository` adapters. The in-memory store is the default; the
//! Postgres store is compiled with the `postgres` feature.

mod in_memory;
#[cfg(feature = "postgres")]
mod postgres;

pub use in_memory::InMemoryOrderRepository;
#[cfg(feature = "postgres")]
pub use postgres::PostgresOrderRepository;
