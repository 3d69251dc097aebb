//! # Cake Shop Orders
//!
//! Order processing engine for a custom-cake storefront: validation of
//! checkout requests, server-side pricing, persistence behind a pluggable
//! store, status lifecycle and best-effort customer notifications.
//!
//! ## Features
//!
//! - **Fixed-point pricing**: totals computed from a configurable price table
//! - **Aggregated validation**: every failing field reported in one response
//! - **Pluggable storage**: in-memory by default, MongoDB behind `mongodb_backend`
//! - **Guest checkout**: bearer tokens are optional; orders are tied to the
//!   caller when one is supplied
//! - **Fire-and-forget email**: notifications never affect the HTTP outcome
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cakeshop::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AppConfig::load()?;
//!     let addr = config.server.bind_address();
//!
//!     ServerBuilder::new()
//!         .with_config(config)
//!         .with_order_store(InMemoryOrderStore::new())
//!         .serve(&addr)
//!         .await
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod core;
pub mod notify;
pub mod orders;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    pub use crate::catalog::{Cake, Catalog};
    pub use crate::config::AppConfig;
    pub use crate::core::{
        auth::{AuthContext, AuthPolicy, Identity, IdentityProvider, JwtIdentityProvider, Role},
        error::{FieldValidationError, OrderError, OrderResult, StoreError, StoreResult},
        order::{CakeColors, CakeDesign, DeliveryType, Order, OrderStatus, PaymentMethod},
        pricing::PriceTable,
        store::{OrderStats, OrderStore},
        validation::{OrderInput, ValidatedOrder},
    };
    pub use crate::notify::{NotificationDispatcher, Notifier, OrderNotification};
    pub use crate::orders::{OrderFilter, OrderService, TransitionPolicy};
    pub use crate::server::{ServerBuilder, ServerHost};
    pub use crate::storage::InMemoryOrderStore;
    #[cfg(feature = "mongodb_backend")]
    pub use crate::storage::MongoOrderStore;
}
