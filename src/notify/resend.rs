//! Transactional email through the Resend HTTP API

use async_trait::async_trait;
use serde::Serialize;

use super::{EmailMessage, Notifier, OrderNotification};
use crate::config::NotificationsConfig;
use crate::core::error::NotifyError;

pub const DEFAULT_API_URL: &str = "https://api.resend.com/emails";

#[derive(Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    text: &'a str,
    html: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
}

pub struct ResendNotifier {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    from: String,
    reply_to: Option<String>,
    shop_name: String,
}

impl ResendNotifier {
    pub fn from_config(config: &NotificationsConfig) -> anyhow::Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("notifications.api_key (RESEND_API_KEY) is required for the resend provider"))?;

        Ok(Self {
            client: reqwest::Client::new(),
            api_url: config
                .api_url
                .clone()
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            api_key,
            from: config.from.clone(),
            reply_to: config.reply_to.clone(),
            shop_name: config.shop_name.clone(),
        })
    }
}

#[async_trait]
impl Notifier for ResendNotifier {
    async fn send(&self, notification: &OrderNotification) -> Result<(), NotifyError> {
        let message = EmailMessage::render(notification, &self.shop_name);
        let body = SendEmailRequest {
            from: &self.from,
            to: [&message.to],
            subject: &message.subject,
            text: &message.text,
            html: &message.html,
            reply_to: self.reply_to.as_deref(),
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let detail = response.text().await.unwrap_or_default();
        Err(NotifyError::Rejected(format!("{}: {}", status, detail)))
    }

    fn name(&self) -> &'static str {
        "resend"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_api_key() {
        let config = NotificationsConfig {
            provider: "resend".to_string(),
            api_key: None,
            ..Default::default()
        };
        assert!(ResendNotifier::from_config(&config).is_err());
    }

    #[test]
    fn test_request_body_shape() {
        let body = SendEmailRequest {
            from: "Cube Cake <orders@example.com>",
            to: ["jane@x.com"],
            subject: "s",
            text: "t",
            html: "h",
            reply_to: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["to"], serde_json::json!(["jane@x.com"]));
        assert!(json.get("reply_to").is_none());
    }
}
