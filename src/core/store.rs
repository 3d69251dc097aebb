//! Persistence contract for order records

use crate::core::error::StoreResult;
use crate::core::order::{Order, OrderStatus};
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Store trait for order records
///
/// Implementations must make each individual call atomic and enforce
/// uniqueness of `Order::order_id`. Every `find_*` method returns orders
/// newest first.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Insert a new order
    ///
    /// Fails with `StoreError::DuplicateKey` if the order id is taken.
    async fn create(&self, order: Order) -> StoreResult<Order>;

    /// Fetch an order by its external id
    async fn find_by_id(&self, order_id: &str) -> StoreResult<Order>;

    /// All orders, newest first
    async fn find_all(&self) -> StoreResult<Vec<Order>>;

    async fn find_by_status(&self, status: OrderStatus) -> StoreResult<Vec<Order>>;

    /// Orders placed by an authenticated user
    async fn find_by_owner(&self, user_id: &str) -> StoreResult<Vec<Order>>;

    /// Set the status and bump `updated_at`
    async fn update_status(&self, order_id: &str, status: OrderStatus) -> StoreResult<Order>;

    /// Compare-and-set variant of [`update_status`](Self::update_status)
    ///
    /// Writes only while the stored status is still `expected`; otherwise
    /// fails with `StoreError::StatusConflict` carrying the status found.
    async fn transition(
        &self,
        order_id: &str,
        expected: OrderStatus,
        status: OrderStatus,
    ) -> StoreResult<Order>;

    /// Hard delete
    async fn delete(&self, order_id: &str) -> StoreResult<()>;

    /// Aggregate counters computed from the current records
    ///
    /// `today` selects which orders count towards `today_count`/`today_sum`
    /// (by creation date, UTC).
    async fn aggregate_stats(&self, today: NaiveDate) -> StoreResult<OrderStats>;

    /// Short backend name for logs and health reports
    fn backend_name(&self) -> &'static str;

    /// Check the backend is reachable
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

/// Read-only aggregate over all orders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStats {
    pub total_count: u64,
    pub count_by_status: BTreeMap<OrderStatus, u64>,
    #[serde(with = "rust_decimal::serde::float")]
    pub sum_of_total_price: Decimal,
    pub today_count: u64,
    #[serde(with = "rust_decimal::serde::float")]
    pub today_sum: Decimal,
}

impl Default for OrderStats {
    fn default() -> Self {
        Self {
            total_count: 0,
            count_by_status: OrderStatus::ALL.into_iter().map(|s| (s, 0)).collect(),
            sum_of_total_price: Decimal::ZERO,
            today_count: 0,
            today_sum: Decimal::ZERO,
        }
    }
}

impl OrderStats {
    /// Fold a sequence of orders into a snapshot
    pub fn from_orders<'a>(orders: impl IntoIterator<Item = &'a Order>, today: NaiveDate) -> Self {
        let mut stats = Self::default();
        for order in orders {
            stats.total_count += 1;
            *stats.count_by_status.entry(order.status).or_insert(0) += 1;
            stats.sum_of_total_price += order.total_price;
            if order.created_at.date_naive() == today {
                stats.today_count += 1;
                stats.today_sum += order.total_price;
            }
        }
        stats
    }

    pub fn count(&self, status: OrderStatus) -> u64 {
        self.count_by_status.get(&status).copied().unwrap_or(0)
    }
}
