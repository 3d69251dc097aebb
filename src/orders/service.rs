//! Order lifecycle operations
//!
//! The service owns the sequence validate, price, persist, notify. It is the
//! only writer to the store and never touches HTTP types.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use super::ids::{OrderIdGenerator, TimestampIdGenerator};
use super::policy::TransitionPolicy;
use crate::core::auth::AuthContext;
use crate::core::error::{OrderError, OrderResult, StoreError};
use crate::core::order::{Order, OrderStatus};
use crate::core::pricing::PriceTable;
use crate::core::store::{OrderStats, OrderStore};
use crate::core::validation::{OrderInput, validate};
use crate::notify::{NotificationDispatcher, OrderNotification};

/// Attempts at a fresh order id before giving up
pub const MAX_ID_ATTEMPTS: usize = 3;

/// Compare-and-set attempts for one status update
pub const MAX_TRANSITION_ATTEMPTS: usize = 3;

/// Filters for [`OrderService::list_orders`]; both are optional and combine
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub owner: Option<String>,
}

impl OrderFilter {
    pub fn by_status(status: OrderStatus) -> Self {
        Self {
            status: Some(status),
            owner: None,
        }
    }

    pub fn by_owner(owner: impl Into<String>) -> Self {
        Self {
            status: None,
            owner: Some(owner.into()),
        }
    }
}

pub struct OrderService {
    store: Arc<dyn OrderStore>,
    pricing: Arc<PriceTable>,
    ids: Arc<dyn OrderIdGenerator>,
    notifications: NotificationDispatcher,
    transition_policy: TransitionPolicy,
}

impl OrderService {
    pub fn new(store: Arc<dyn OrderStore>, notifications: NotificationDispatcher) -> Self {
        Self {
            store,
            pricing: Arc::new(PriceTable::default()),
            ids: Arc::new(TimestampIdGenerator),
            notifications,
            transition_policy: TransitionPolicy::default(),
        }
    }

    pub fn with_pricing(mut self, pricing: PriceTable) -> Self {
        self.pricing = Arc::new(pricing);
        self
    }

    pub fn with_transition_policy(mut self, policy: TransitionPolicy) -> Self {
        self.transition_policy = policy;
        self
    }

    pub fn with_id_generator(mut self, ids: Arc<dyn OrderIdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn store(&self) -> &Arc<dyn OrderStore> {
        &self.store
    }

    pub fn pricing(&self) -> &PriceTable {
        &self.pricing
    }

    /// Validate, price and persist a new order, then queue the confirmation
    ///
    /// The caller's identity, if any, becomes the owner. Any client-side
    /// price is ignored.
    pub async fn place_order(&self, input: &OrderInput, context: &AuthContext) -> OrderResult<Order> {
        let now = Utc::now();
        let validated = validate(input, now.date_naive()).map_err(OrderError::Validation)?;
        let total_price = self
            .pricing
            .compute_price(&validated.design, validated.delivery_type);

        for attempt in 1..=MAX_ID_ATTEMPTS {
            let order = Order {
                id: Uuid::new_v4(),
                order_id: self.ids.next_id(),
                customer_name: validated.customer_name.clone(),
                phone: validated.phone.clone(),
                email: validated.email.clone(),
                delivery_date: validated.delivery_date,
                delivery_type: validated.delivery_type,
                delivery_address: validated.delivery_address.clone(),
                special_instructions: validated.special_instructions.clone(),
                payment_method: validated.payment_method,
                design: validated.design.clone(),
                total_price,
                status: OrderStatus::Pending,
                user_id: context.user_id().map(str::to_string),
                created_at: now,
                updated_at: now,
            };

            match self.store.create(order).await {
                Ok(order) => {
                    tracing::info!(
                        order_id = %order.order_id,
                        total = %order.total_price,
                        guest = order.user_id.is_none(),
                        "order placed"
                    );
                    self.notifications.dispatch(OrderNotification::Placed {
                        order: order.clone(),
                    });
                    return Ok(order);
                }
                Err(StoreError::DuplicateKey { order_id }) => {
                    tracing::warn!(order_id = %order_id, attempt, "order id collision, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }

        tracing::error!(attempts = MAX_ID_ATTEMPTS, "could not allocate a unique order id");
        Err(OrderError::IdCollision)
    }

    /// Change the status of an order
    ///
    /// `raw_status` must name one of the five statuses (any case). The
    /// policy is checked against the status the write is conditioned on, so
    /// a concurrent change is re-checked rather than overwritten. A
    /// notification is queued only when the status actually changes.
    pub async fn update_status(
        &self,
        order_id: &str,
        raw_status: &str,
        context: &AuthContext,
    ) -> OrderResult<Order> {
        let status: OrderStatus = raw_status.parse().map_err(|value| OrderError::InvalidStatus { value })?;

        let mut current = self.store.find_by_id(order_id).await?.status;
        for attempt in 1..=MAX_TRANSITION_ATTEMPTS {
            if !self.transition_policy.permits(current, status, context) {
                return Err(OrderError::InvalidTransition {
                    from: current,
                    to: status,
                });
            }

            match self.store.transition(order_id, current, status).await {
                Ok(updated) => {
                    if current != updated.status {
                        tracing::info!(
                            order_id = %order_id,
                            from = %current,
                            to = %updated.status,
                            "order status changed"
                        );
                        self.notifications.dispatch(OrderNotification::StatusChanged {
                            order: updated.clone(),
                            previous: current,
                        });
                    }
                    return Ok(updated);
                }
                Err(StoreError::StatusConflict { actual, .. }) => {
                    tracing::warn!(
                        order_id = %order_id,
                        expected = %current,
                        actual = %actual,
                        attempt,
                        "status changed concurrently, re-checking"
                    );
                    current = actual;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(OrderError::Conflict {
            order_id: order_id.to_string(),
        })
    }

    pub async fn get_order(&self, order_id: &str) -> OrderResult<Order> {
        tracing::debug!(order_id = %order_id, "get order");
        Ok(self.store.find_by_id(order_id).await?)
    }

    /// Orders matching the filter, newest first
    pub async fn list_orders(&self, filter: &OrderFilter) -> OrderResult<Vec<Order>> {
        tracing::debug!(?filter, "list orders");
        let orders = match (&filter.status, &filter.owner) {
            (None, None) => self.store.find_all().await?,
            (Some(status), None) => self.store.find_by_status(*status).await?,
            (None, Some(owner)) => self.store.find_by_owner(owner).await?,
            (Some(status), Some(owner)) => self
                .store
                .find_by_owner(owner)
                .await?
                .into_iter()
                .filter(|o| o.status == *status)
                .collect(),
        };
        Ok(orders)
    }

    /// Hard delete
    pub async fn delete_order(&self, order_id: &str) -> OrderResult<()> {
        self.store.delete(order_id).await?;
        tracing::info!(order_id = %order_id, "order deleted");
        Ok(())
    }

    pub async fn stats(&self) -> OrderResult<OrderStats> {
        Ok(self.store.aggregate_stats(Utc::now().date_naive()).await?)
    }
}
