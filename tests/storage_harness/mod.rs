//! Shared test harness for order store backends
//!
//! Provides order fixtures and the `order_store_tests!` macro, which generates
//! the full `OrderStore` contract suite for any backend.
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//!
//! use storage_harness::*;
//! order_store_tests!(InMemoryOrderStore::new());
//! ```

#![allow(dead_code)]

#[macro_use]
mod order_store_tests;

use cakeshop::core::order::{CakeColors, CakeDesign, DeliveryType, Order, OrderStatus, PaymentMethod};
use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A pickup order priced at `cents`, created `age_secs` seconds ago
pub fn order_with(order_id: &str, status: OrderStatus, owner: Option<&str>, cents: i64, age_secs: i64) -> Order {
    let created_at = Utc::now() - Duration::seconds(age_secs);
    Order {
        id: Uuid::new_v4(),
        order_id: order_id.to_string(),
        customer_name: "Jane Doe".to_string(),
        phone: "0771234567".to_string(),
        email: "jane@x.com".to_string(),
        delivery_date: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
        delivery_type: DeliveryType::Pickup,
        delivery_address: None,
        special_instructions: Some("No nuts please".to_string()),
        payment_method: PaymentMethod::Cash,
        design: CakeDesign {
            base: "chocolate".to_string(),
            frosting: "vanilla".to_string(),
            size: "medium".to_string(),
            layers: 3,
            toppings: vec!["sprinkles".to_string()],
            message: Some("Happy Birthday".to_string()),
            colors: CakeColors::default(),
        },
        total_price: Decimal::new(cents, 2),
        status,
        user_id: owner.map(str::to_string),
        created_at,
        updated_at: created_at,
    }
}

/// A fresh pending guest order at 52.99
pub fn sample_order(order_id: &str) -> Order {
    order_with(order_id, OrderStatus::Pending, None, 5299, 0)
}

pub fn order_ids(orders: &[Order]) -> Vec<&str> {
    orders.iter().map(|o| o.order_id.as_str()).collect()
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}
