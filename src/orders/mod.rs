//! Order lifecycle: placement, status changes, queries and their HTTP surface

pub mod handlers;
pub mod ids;
pub mod policy;
pub mod service;

pub use ids::{OrderIdGenerator, TimestampIdGenerator};
pub use policy::TransitionPolicy;
pub use service::{OrderFilter, OrderService};
