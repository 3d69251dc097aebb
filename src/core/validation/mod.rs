//! Validation and filtering
//!
//! Field-level validators and filters are small reusable closures; the order
//! validator composes them into the checkout rules and reports every failure
//! at once.

pub mod filters;
pub mod order;
pub mod validators;

pub use order::{OrderInput, ValidatedOrder, validate};
