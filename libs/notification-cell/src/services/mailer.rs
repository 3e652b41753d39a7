use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client,
};
use serde_json::json;
use tracing::{debug, error, info};

use shared_config::AppConfig;

use crate::models::{EmailMessage, NotificationError};

/// Outbound notification channel.
///
/// Booking flows treat delivery as best-effort; implementations must not
/// panic and should keep failures inside `NotificationError`.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), NotificationError>;
}

/// HTTP client for the transactional mail relay.
pub struct MailerClient {
    client: Client,
    base_url: String,
    api_token: String,
    from_address: String,
    from_name: String,
}

impl MailerClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.mailer_base_url.clone(),
            api_token: config.mailer_api_token.clone(),
            from_address: config.mail_from_address.clone(),
            from_name: config.mail_from_name.clone(),
        }
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Ok(bearer) = HeaderValue::from_str(&format!("Bearer {}", self.api_token)) {
            headers.insert(AUTHORIZATION, bearer);
        }
        headers
    }
}

#[async_trait]
impl Notifier for MailerClient {
    async fn send(&self, message: &EmailMessage) -> Result<(), NotificationError> {
        if self.base_url.is_empty() || self.api_token.is_empty() {
            return Err(NotificationError::NotConfigured);
        }

        let url = format!("{}/messages", self.base_url);
        debug!("Sending email to {} via {}", message.to, url);

        let body = json!({
            "from": { "address": self.from_address, "name": self.from_name },
            "to": [{ "address": message.to, "name": message.to_name }],
            "subject": message.subject,
            "text_body": message.text_body,
        });

        let response = self
            .client
            .post(&url)
            .headers(self.headers())
            .json(&body)
            .send()
            .await
            .map_err(|e| NotificationError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Mail relay error ({}): {}", status, error_text);
            return Err(NotificationError::Relay(format!("{}: {}", status, error_text)));
        }

        info!("Email \"{}\" sent to {}", message.subject, message.to);
        Ok(())
    }
}

/// Swallows messages; used when the relay is not configured.
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn send(&self, message: &EmailMessage) -> Result<(), NotificationError> {
        debug!("Mailer disabled, dropping email \"{}\" to {}", message.subject, message.to);
        Ok(())
    }
}
