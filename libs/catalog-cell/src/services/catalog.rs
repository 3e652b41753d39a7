use std::sync::Arc;

use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::{DbError, PostgrestClient};

use crate::models::{
    CatalogError, CreateServiceRequest, Service, UpdateServiceRequest, MAX_SERVICE_DURATION,
    MIN_SERVICE_DURATION,
};

pub struct CatalogService {
    db: Arc<PostgrestClient>,
}

impl CatalogService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            db: Arc::new(PostgrestClient::new(config)),
        }
    }

    pub fn with_client(db: Arc<PostgrestClient>) -> Self {
        Self { db }
    }

    pub async fn create_service(&self, request: CreateServiceRequest) -> Result<Service, CatalogError> {
        debug!("Creating service: {}", request.name);

        if request.name.trim().is_empty() {
            return Err(CatalogError::Validation("Service name is required".to_string()));
        }
        validate_duration(request.duration_minutes)?;

        let now = Utc::now();
        let service_data = json!({
            "name": request.name.trim(),
            "description": request.description,
            "duration_minutes": request.duration_minutes,
            "price_cents": request.price_cents,
            "is_active": true,
            "created_at": now.to_rfc3339(),
            "updated_at": now.to_rfc3339(),
        });

        let result: Vec<Service> = self
            .db
            .insert_returning("/rest/v1/services", service_data)
            .await
            .map_err(map_db_error)?;

        let service = result
            .into_iter()
            .next()
            .ok_or_else(|| CatalogError::DatabaseError("Failed to create service".to_string()))?;

        info!("Service {} created ({} min)", service.id, service.duration_minutes);
        Ok(service)
    }

    pub async fn update_service(
        &self,
        service_id: Uuid,
        request: UpdateServiceRequest,
    ) -> Result<Service, CatalogError> {
        debug!("Updating service: {}", service_id);

        self.get_service(service_id).await?;

        let mut update_data = serde_json::Map::new();
        if let Some(name) = request.name {
            if name.trim().is_empty() {
                return Err(CatalogError::Validation("Service name cannot be empty".to_string()));
            }
            update_data.insert("name".to_string(), json!(name.trim()));
        }
        if let Some(description) = request.description {
            update_data.insert("description".to_string(), json!(description));
        }
        if let Some(duration) = request.duration_minutes {
            validate_duration(duration)?;
            update_data.insert("duration_minutes".to_string(), json!(duration));
        }
        if let Some(price) = request.price_cents {
            update_data.insert("price_cents".to_string(), json!(price));
        }
        if let Some(is_active) = request.is_active {
            update_data.insert("is_active".to_string(), json!(is_active));
        }
        update_data.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        let path = format!("/rest/v1/services?id=eq.{}", service_id);
        let result: Vec<Service> = self
            .db
            .update_returning(&path, Value::Object(update_data))
            .await
            .map_err(map_db_error)?;

        result.into_iter().next().ok_or(CatalogError::NotFound)
    }

    pub async fn get_service(&self, service_id: Uuid) -> Result<Service, CatalogError> {
        let path = format!("/rest/v1/services?id=eq.{}", service_id);
        let result: Vec<Service> = self
            .db
            .request(Method::GET, &path, None)
            .await
            .map_err(map_db_error)?;

        result.into_iter().next().ok_or(CatalogError::NotFound)
    }

    pub async fn list_services(&self, active_only: bool) -> Result<Vec<Service>, CatalogError> {
        let mut path = "/rest/v1/services?order=name.asc".to_string();
        if active_only {
            path.push_str("&is_active=eq.true");
        }

        let services: Vec<Service> = self
            .db
            .request(Method::GET, &path, None)
            .await
            .map_err(map_db_error)?;

        Ok(services)
    }
}

fn validate_duration(duration_minutes: i32) -> Result<(), CatalogError> {
    if duration_minutes < MIN_SERVICE_DURATION || duration_minutes > MAX_SERVICE_DURATION {
        return Err(CatalogError::Validation(format!(
            "Service duration must be between {} and {} minutes",
            MIN_SERVICE_DURATION, MAX_SERVICE_DURATION
        )));
    }
    Ok(())
}

fn map_db_error(e: DbError) -> CatalogError {
    match e {
        DbError::NotFound(_) => CatalogError::NotFound,
        other => CatalogError::DatabaseError(other.to_string()),
    }
}
