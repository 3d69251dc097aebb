//! Notifier that writes rendered messages to the log
//!
//! Default provider for development and tests; nothing leaves the process.

use async_trait::async_trait;

use super::{EmailMessage, Notifier, OrderNotification};
use crate::core::error::NotifyError;

pub struct LogNotifier {
    shop_name: String,
}

impl LogNotifier {
    pub fn new(shop_name: impl Into<String>) -> Self {
        Self {
            shop_name: shop_name.into(),
        }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, notification: &OrderNotification) -> Result<(), NotifyError> {
        let message = EmailMessage::render(notification, &self.shop_name);
        tracing::info!(to = %message.to, subject = %message.subject, "email (log provider)");
        tracing::debug!(body = %message.text);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
