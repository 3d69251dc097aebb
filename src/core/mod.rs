//! Core module containing the order domain: model, pricing, validation,
//! storage contract, identity and errors

pub mod auth;
pub mod error;
pub mod order;
pub mod pricing;
pub mod store;
pub mod validation;

pub use auth::{AuthContext, AuthPolicies, AuthPolicy, Identity, IdentityProvider, Operation, Role};
pub use error::{FieldValidationError, NotifyError, OrderError, OrderResult, StoreError, StoreResult};
pub use order::{CakeColors, CakeDesign, DeliveryType, Order, OrderStatus, PaymentMethod};
pub use pricing::PriceTable;
pub use store::{OrderStats, OrderStore};
