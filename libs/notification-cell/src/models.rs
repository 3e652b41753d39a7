// libs/notification-cell/src/models.rs
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: String,
    pub to_name: Option<String>,
    pub subject: String,
    pub text_body: String,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum NotificationError {
    #[error("Mail relay not configured")]
    NotConfigured,

    #[error("Mail relay error: {0}")]
    Relay(String),

    #[error("Transport error: {0}")]
    Transport(String),
}
