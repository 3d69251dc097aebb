//! In-memory implementation of OrderStore for testing and development

use crate::core::error::{StoreError, StoreResult};
use crate::core::order::{Order, OrderStatus};
use crate::core::store::{OrderStats, OrderStore};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock};
use uuid::Uuid;

const BACKEND: &str = "in_memory";

/// Creation-time ordering key; the uuid breaks ties
type CreatedKey = (DateTime<Utc>, Uuid);

#[derive(Default)]
struct Tables {
    orders: HashMap<Uuid, Order>,
    /// Unique external id
    by_order_id: HashMap<String, Uuid>,
    by_created: BTreeSet<CreatedKey>,
    by_status: HashMap<OrderStatus, BTreeSet<CreatedKey>>,
    by_owner: HashMap<String, BTreeSet<CreatedKey>>,
}

impl Tables {
    fn key(order: &Order) -> CreatedKey {
        (order.created_at, order.id)
    }

    fn index(&mut self, order: &Order) {
        let key = Self::key(order);
        self.by_order_id.insert(order.order_id.clone(), order.id);
        self.by_created.insert(key);
        self.by_status.entry(order.status).or_default().insert(key);
        if let Some(owner) = &order.user_id {
            self.by_owner.entry(owner.clone()).or_default().insert(key);
        }
    }

    fn unindex(&mut self, order: &Order) {
        let key = Self::key(order);
        self.by_order_id.remove(&order.order_id);
        self.by_created.remove(&key);
        if let Some(set) = self.by_status.get_mut(&order.status) {
            set.remove(&key);
        }
        if let Some(owner) = &order.user_id
            && let Some(set) = self.by_owner.get_mut(owner)
        {
            set.remove(&key);
            if set.is_empty() {
                self.by_owner.remove(owner);
            }
        }
    }

    fn lookup(&self, order_id: &str) -> Option<&Order> {
        self.by_order_id
            .get(order_id)
            .and_then(|id| self.orders.get(id))
    }

    /// Resolve an index range, newest first
    fn newest_first<'a>(&self, keys: impl DoubleEndedIterator<Item = &'a CreatedKey>) -> Vec<Order> {
        keys.rev()
            .filter_map(|(_, id)| self.orders.get(id).cloned())
            .collect()
    }
}

/// In-memory order store
///
/// One `RwLock` guards the records and every index, so each call is atomic.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryOrderStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<std::sync::RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|e| StoreError::unavailable(BACKEND, format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> StoreResult<std::sync::RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|e| StoreError::unavailable(BACKEND, format!("Failed to acquire write lock: {}", e)))
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn create(&self, order: Order) -> StoreResult<Order> {
        let mut tables = self.write()?;

        if tables.by_order_id.contains_key(&order.order_id) {
            return Err(StoreError::DuplicateKey {
                order_id: order.order_id,
            });
        }

        tables.index(&order);
        tables.orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn find_by_id(&self, order_id: &str) -> StoreResult<Order> {
        let tables = self.read()?;
        tables
            .lookup(order_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                order_id: order_id.to_string(),
            })
    }

    async fn find_all(&self) -> StoreResult<Vec<Order>> {
        let tables = self.read()?;
        Ok(tables.newest_first(tables.by_created.iter()))
    }

    async fn find_by_status(&self, status: OrderStatus) -> StoreResult<Vec<Order>> {
        let tables = self.read()?;
        Ok(match tables.by_status.get(&status) {
            Some(keys) => tables.newest_first(keys.iter()),
            None => Vec::new(),
        })
    }

    async fn find_by_owner(&self, user_id: &str) -> StoreResult<Vec<Order>> {
        let tables = self.read()?;
        Ok(match tables.by_owner.get(user_id) {
            Some(keys) => tables.newest_first(keys.iter()),
            None => Vec::new(),
        })
    }

    async fn update_status(&self, order_id: &str, status: OrderStatus) -> StoreResult<Order> {
        let mut tables = self.write()?;

        let mut order = tables
            .lookup(order_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                order_id: order_id.to_string(),
            })?;

        tables.unindex(&order);
        order.transition_to(status);
        tables.index(&order);
        tables.orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn transition(
        &self,
        order_id: &str,
        expected: OrderStatus,
        status: OrderStatus,
    ) -> StoreResult<Order> {
        let mut tables = self.write()?;

        let mut order = tables
            .lookup(order_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                order_id: order_id.to_string(),
            })?;
        if order.status != expected {
            return Err(StoreError::StatusConflict {
                order_id: order_id.to_string(),
                actual: order.status,
            });
        }

        tables.unindex(&order);
        order.transition_to(status);
        tables.index(&order);
        tables.orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn delete(&self, order_id: &str) -> StoreResult<()> {
        let mut tables = self.write()?;

        let order = tables
            .lookup(order_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                order_id: order_id.to_string(),
            })?;

        tables.unindex(&order);
        tables.orders.remove(&order.id);
        Ok(())
    }

    async fn aggregate_stats(&self, today: NaiveDate) -> StoreResult<OrderStats> {
        let tables = self.read()?;
        Ok(OrderStats::from_orders(tables.orders.values(), today))
    }

    fn backend_name(&self) -> &'static str {
        BACKEND
    }

    async fn ping(&self) -> StoreResult<()> {
        self.read().map(|_| ())
    }
}
