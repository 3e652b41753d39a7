use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub database_service_key: String,
    pub admin_api_key: String,
    pub mailer_base_url: String,
    pub mailer_api_token: String,
    pub mail_from_address: String,
    pub mail_from_name: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            database_url: env::var("DATABASE_REST_URL")
                .unwrap_or_else(|_| {
                    warn!("DATABASE_REST_URL not set, using empty value");
                    String::new()
                }),
            database_service_key: env::var("DATABASE_SERVICE_KEY")
                .unwrap_or_else(|_| {
                    warn!("DATABASE_SERVICE_KEY not set, using empty value");
                    String::new()
                }),
            admin_api_key: env::var("ADMIN_API_KEY")
                .unwrap_or_else(|_| {
                    warn!("ADMIN_API_KEY not set, using empty value");
                    String::new()
                }),
            mailer_base_url: env::var("MAILER_BASE_URL")
                .unwrap_or_else(|_| {
                    warn!("MAILER_BASE_URL not set, using empty value");
                    String::new()
                }),
            mailer_api_token: env::var("MAILER_API_TOKEN")
                .unwrap_or_else(|_| {
                    warn!("MAILER_API_TOKEN not set, using empty value");
                    String::new()
                }),
            mail_from_address: env::var("MAIL_FROM_ADDRESS")
                .unwrap_or_else(|_| {
                    warn!("MAIL_FROM_ADDRESS not set, using default");
                    "no-reply@localhost".to_string()
                }),
            mail_from_name: env::var("MAIL_FROM_NAME")
                .unwrap_or_else(|_| "Appointment Desk".to_string()),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.database_url.is_empty()
            && !self.database_service_key.is_empty()
            && !self.admin_api_key.is_empty()
    }

    pub fn is_mailer_configured(&self) -> bool {
        !self.mailer_base_url.is_empty() && !self.mailer_api_token.is_empty()
    }
}
