//! Domain Layer
//!
//! Business types with no infrastructure dependencies.
//!
//! - [`order`]: Order aggregate and the status lifecycle
//! - [`user`]: Users and role tags
//! - [`market`]: Tradable markets

pub mod market;
pub mod order;
pub mod user;

pub use market::{Market, MarketId};
pub use order::{NewOrder, Order, OrderId, OrderStatus, ReconstitutedOrder, UnknownOrderStatus};
pub use user::{User, UserId};
