//! Order notifications
//!
//! A [`Notifier`] delivers one message; the [`NotificationDispatcher`] runs it
//! on a detached task with a deadline so the request that triggered it never
//! waits on, or fails because of, the email provider.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;

use crate::config::NotificationsConfig;
use crate::core::error::NotifyError;
use crate::core::order::{Order, OrderStatus};

pub mod log;
#[cfg(feature = "email")]
pub mod resend;
pub mod template;

pub use log::LogNotifier;
#[cfg(feature = "email")]
pub use resend::ResendNotifier;
pub use template::EmailMessage;

/// Something worth telling the customer about
#[derive(Debug, Clone, PartialEq)]
pub enum OrderNotification {
    /// Confirmation after a successful checkout
    Placed { order: Order },

    /// The order moved to a different status
    StatusChanged { order: Order, previous: OrderStatus },
}

impl OrderNotification {
    pub fn order(&self) -> &Order {
        match self {
            OrderNotification::Placed { order } => order,
            OrderNotification::StatusChanged { order, .. } => order,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            OrderNotification::Placed { .. } => "order_placed",
            OrderNotification::StatusChanged { .. } => "status_changed",
        }
    }
}

/// Delivery channel for notifications
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: &OrderNotification) -> Result<(), NotifyError>;

    /// Short provider name for logs
    fn name(&self) -> &'static str;
}

/// Fire-and-forget dispatch with a bounded timeout
#[derive(Clone)]
pub struct NotificationDispatcher {
    notifier: Arc<dyn Notifier>,
    timeout: Duration,
}

impl NotificationDispatcher {
    pub fn new(notifier: Arc<dyn Notifier>, timeout: Duration) -> Self {
        Self { notifier, timeout }
    }

    pub fn provider(&self) -> &'static str {
        self.notifier.name()
    }

    /// Spawn delivery and return immediately
    ///
    /// The outcome is only logged. The handle is returned so tests can await
    /// delivery; production callers drop it.
    pub fn dispatch(&self, notification: OrderNotification) -> JoinHandle<()> {
        let notifier = self.notifier.clone();
        let timeout = self.timeout;

        tokio::spawn(async move {
            let order_id = notification.order().order_id.clone();
            let kind = notification.kind();

            let outcome = match tokio::time::timeout(timeout, notifier.send(&notification)).await
            {
                Ok(result) => result,
                Err(_) => Err(NotifyError::Timeout(timeout)),
            };

            match outcome {
                Ok(()) => tracing::info!(
                    order_id = %order_id,
                    kind,
                    provider = notifier.name(),
                    "notification sent"
                ),
                Err(e) => tracing::warn!(
                    order_id = %order_id,
                    kind,
                    provider = notifier.name(),
                    error = %e,
                    "notification failed"
                ),
            }
        })
    }
}

/// Build the notifier selected by `notifications.provider`
pub fn build_notifier(config: &NotificationsConfig) -> anyhow::Result<Arc<dyn Notifier>> {
    match config.provider.as_str() {
        "log" => Ok(Arc::new(LogNotifier::new(config.shop_name.clone()))),
        #[cfg(feature = "email")]
        "resend" => Ok(Arc::new(ResendNotifier::from_config(config)?)),
        other => Err(anyhow::anyhow!(
            "Unsupported notification provider '{}' (enable the matching feature)",
            other
        )),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::order::{CakeColors, CakeDesign, DeliveryType, PaymentMethod};
    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;
    use std::sync::Mutex;
    use uuid::Uuid;

    pub(crate) fn sample_order() -> Order {
        let now = Utc::now();
        Order {
            id: Uuid::new_v4(),
            order_id: "ORDER-1700000000000-a1b2c3".to_string(),
            customer_name: "Jane Doe".to_string(),
            phone: "0771234567".to_string(),
            email: "jane@x.com".to_string(),
            delivery_date: NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
            delivery_type: DeliveryType::Pickup,
            delivery_address: None,
            special_instructions: None,
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
            total_price: Decimal::new(5299, 2),
            status: OrderStatus::Pending,
            user_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[derive(Default)]
    struct Recording {
        sent: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Notifier for Recording {
        async fn send(&self, n: &OrderNotification) -> Result<(), NotifyError> {
            self.sent.lock().unwrap().push(n.kind().to_string());
            Ok(())
        }

        fn name(&self) -> &'static str {
            "recording"
        }
    }

    struct Slow;

    #[async_trait]
    impl Notifier for Slow {
        async fn send(&self, _: &OrderNotification) -> Result<(), NotifyError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        }

        fn name(&self) -> &'static str {
            "slow"
        }
    }

    struct Failing;

    #[async_trait]
    impl Notifier for Failing {
        async fn send(&self, _: &OrderNotification) -> Result<(), NotifyError> {
            Err(NotifyError::Rejected("mailbox full".to_string()))
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    #[tokio::test]
    async fn test_dispatch_delivers() {
        let recording = Arc::new(Recording::default());
        let dispatcher = NotificationDispatcher::new(recording.clone(), Duration::from_secs(1));

        dispatcher
            .dispatch(OrderNotification::Placed {
                order: sample_order(),
            })
            .await
            .unwrap();

        assert_eq!(*recording.sent.lock().unwrap(), vec!["order_placed"]);
    }

    #[tokio::test]
    async fn test_dispatch_times_out_without_panicking() {
        let dispatcher = NotificationDispatcher::new(Arc::new(Slow), Duration::from_millis(50));
        let handle = dispatcher.dispatch(OrderNotification::Placed {
            order: sample_order(),
        });
        assert!(handle.await.is_ok());
    }

    #[tokio::test]
    async fn test_dispatch_swallows_failures() {
        let dispatcher = NotificationDispatcher::new(Arc::new(Failing), Duration::from_secs(1));
        let handle = dispatcher.dispatch(OrderNotification::StatusChanged {
            order: sample_order(),
            previous: OrderStatus::Pending,
        });
        assert!(handle.await.is_ok());
    }

    #[test]
    fn test_build_notifier_rejects_unknown_provider() {
        let config = NotificationsConfig {
            provider: "carrier-pigeon".to_string(),
            ..Default::default()
        };
        assert!(build_notifier(&config).is_err());
        assert_eq!(
            build_notifier(&NotificationsConfig::default()).unwrap().name(),
            "log"
        );
    }
}
