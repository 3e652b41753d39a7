// libs/catalog-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{CatalogError, CreateServiceRequest, UpdateServiceRequest};
use crate::services::CatalogService;

#[derive(Debug, Deserialize)]
pub struct ListServicesQuery {
    pub include_inactive: Option<bool>,
}

fn map_catalog_error(e: CatalogError) -> AppError {
    match e {
        CatalogError::NotFound => AppError::NotFound("Service not found".to_string()),
        CatalogError::Validation(msg) => AppError::BadRequest(msg),
        CatalogError::DatabaseError(msg) => AppError::Database(msg),
    }
}

#[axum::debug_handler]
pub async fn list_services(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<ListServicesQuery>,
) -> Result<Json<Value>, AppError> {
    let service = CatalogService::new(&state);

    let active_only = !query.include_inactive.unwrap_or(false);
    let services = service
        .list_services(active_only)
        .await
        .map_err(map_catalog_error)?;

    Ok(Json(json!({ "services": services })))
}

#[axum::debug_handler]
pub async fn get_service(
    State(state): State<Arc<AppConfig>>,
    Path(service_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let catalog = CatalogService::new(&state);
    let service = catalog
        .get_service(service_id)
        .await
        .map_err(map_catalog_error)?;

    Ok(Json(json!(service)))
}

#[axum::debug_handler]
pub async fn create_service(
    State(state): State<Arc<AppConfig>>,
    WithRejection(Json(request), _): WithRejection<Json<CreateServiceRequest>, AppError>,
) -> Result<Json<Value>, AppError> {
    let catalog = CatalogService::new(&state);
    let service = catalog
        .create_service(request)
        .await
        .map_err(map_catalog_error)?;

    Ok(Json(json!({
        "success": true,
        "service": service,
    })))
}

#[axum::debug_handler]
pub async fn update_service(
    State(state): State<Arc<AppConfig>>,
    Path(service_id): Path<Uuid>,
    WithRejection(Json(request), _): WithRejection<Json<UpdateServiceRequest>, AppError>,
) -> Result<Json<Value>, AppError> {
    let catalog = CatalogService::new(&state);
    let service = catalog
        .update_service(service_id, request)
        .await
        .map_err(map_catalog_error)?;

    Ok(Json(json!({
        "success": true,
        "service": service,
    })))
}
