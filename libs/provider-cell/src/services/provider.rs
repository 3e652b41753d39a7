use std::sync::Arc;

use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::{DbError, PostgrestClient};
use shared_utils::validation;

use crate::models::{CreateProviderRequest, Provider, ProviderError, UpdateProviderRequest};

pub struct ProviderService {
    db: Arc<PostgrestClient>,
}

impl ProviderService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            db: Arc::new(PostgrestClient::new(config)),
        }
    }

    pub fn with_client(db: Arc<PostgrestClient>) -> Self {
        Self { db }
    }

    pub async fn create_provider(&self, request: CreateProviderRequest) -> Result<Provider, ProviderError> {
        debug!("Creating provider: {}", request.name);

        if request.name.trim().is_empty() {
            return Err(ProviderError::Validation("Provider name is required".to_string()));
        }
        if !validation::validate_email(&request.email) {
            return Err(ProviderError::Validation("Invalid provider email address".to_string()));
        }
        if let Some(phone) = &request.phone {
            if !validation::validate_phone(phone) {
                return Err(ProviderError::Validation("Invalid provider phone number".to_string()));
            }
        }

        let now = Utc::now();
        let provider_data = json!({
            "name": request.name.trim(),
            "email": request.email,
            "phone": request.phone,
            "is_active": true,
            "created_at": now.to_rfc3339(),
            "updated_at": now.to_rfc3339(),
        });

        let result: Vec<Provider> = self
            .db
            .insert_returning("/rest/v1/providers", provider_data)
            .await
            .map_err(map_db_error)?;

        let provider = result
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::DatabaseError("Failed to create provider".to_string()))?;

        info!("Provider {} created", provider.id);
        Ok(provider)
    }

    pub async fn update_provider(
        &self,
        provider_id: Uuid,
        request: UpdateProviderRequest,
    ) -> Result<Provider, ProviderError> {
        debug!("Updating provider: {}", provider_id);

        // Ensure the row exists so a no-op patch still 404s correctly.
        self.get_provider(provider_id).await?;

        let mut update_data = serde_json::Map::new();
        if let Some(name) = request.name {
            if name.trim().is_empty() {
                return Err(ProviderError::Validation("Provider name cannot be empty".to_string()));
            }
            update_data.insert("name".to_string(), json!(name.trim()));
        }
        if let Some(email) = request.email {
            if !validation::validate_email(&email) {
                return Err(ProviderError::Validation("Invalid provider email address".to_string()));
            }
            update_data.insert("email".to_string(), json!(email));
        }
        if let Some(phone) = request.phone {
            update_data.insert("phone".to_string(), json!(phone));
        }
        if let Some(is_active) = request.is_active {
            update_data.insert("is_active".to_string(), json!(is_active));
        }
        update_data.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        let path = format!("/rest/v1/providers?id=eq.{}", provider_id);
        let result: Vec<Provider> = self
            .db
            .update_returning(&path, Value::Object(update_data))
            .await
            .map_err(map_db_error)?;

        result
            .into_iter()
            .next()
            .ok_or(ProviderError::NotFound)
    }

    pub async fn get_provider(&self, provider_id: Uuid) -> Result<Provider, ProviderError> {
        let path = format!("/rest/v1/providers?id=eq.{}", provider_id);
        let result: Vec<Provider> = self
            .db
            .request(Method::GET, &path, None)
            .await
            .map_err(map_db_error)?;

        result.into_iter().next().ok_or(ProviderError::NotFound)
    }

    pub async fn list_providers(&self, active_only: bool) -> Result<Vec<Provider>, ProviderError> {
        let mut path = "/rest/v1/providers?order=name.asc".to_string();
        if active_only {
            path.push_str("&is_active=eq.true");
        }

        let providers: Vec<Provider> = self
            .db
            .request(Method::GET, &path, None)
            .await
            .map_err(map_db_error)?;

        Ok(providers)
    }

    /// Deactivate rather than delete: appointments keep their provider reference.
    pub async fn deactivate_provider(&self, provider_id: Uuid) -> Result<Provider, ProviderError> {
        self.update_provider(
            provider_id,
            UpdateProviderRequest {
                name: None,
                email: None,
                phone: None,
                is_active: Some(false),
            },
        )
        .await
    }
}

pub(crate) fn map_db_error(e: DbError) -> ProviderError {
    match e {
        DbError::NotFound(_) => ProviderError::NotFound,
        other => ProviderError::DatabaseError(other.to_string()),
    }
}
