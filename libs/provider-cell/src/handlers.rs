// libs/provider-cell/src/handlers.rs
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

use crate::models::{
    CreateProviderRequest, CreateTimeOffRequest, ProviderError, UpdateProviderRequest,
    UpsertHoursRequest,
};
use crate::services::{ProviderService, ScheduleService};

#[derive(Debug, Deserialize)]
pub struct ListProvidersQuery {
    pub include_inactive: Option<bool>,
}

fn map_provider_error(e: ProviderError) -> AppError {
    match e {
        ProviderError::NotFound => AppError::NotFound("Provider not found".to_string()),
        ProviderError::ScheduleNotFound => AppError::NotFound("Schedule entry not found".to_string()),
        ProviderError::Validation(msg) => AppError::BadRequest(msg),
        ProviderError::ScheduleConflict(msg) => AppError::Conflict(msg),
        ProviderError::DatabaseError(msg) => AppError::Database(msg),
    }
}

/// Public listing of bookable providers.
#[axum::debug_handler]
pub async fn list_providers(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<ListProvidersQuery>,
) -> Result<Json<Value>, AppError> {
    let service = ProviderService::new(&state);

    let active_only = !query.include_inactive.unwrap_or(false);
    let providers = service
        .list_providers(active_only)
        .await
        .map_err(map_provider_error)?;

    Ok(Json(json!({ "providers": providers })))
}

#[axum::debug_handler]
pub async fn get_provider(
    State(state): State<Arc<AppConfig>>,
    Path(provider_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = ProviderService::new(&state);
    let provider = service
        .get_provider(provider_id)
        .await
        .map_err(map_provider_error)?;

    Ok(Json(json!(provider)))
}

#[axum::debug_handler]
pub async fn create_provider(
    State(state): State<Arc<AppConfig>>,
    WithRejection(Json(request), _): WithRejection<Json<CreateProviderRequest>, AppError>,
) -> Result<Json<Value>, AppError> {
    let service = ProviderService::new(&state);
    let provider = service
        .create_provider(request)
        .await
        .map_err(map_provider_error)?;

    Ok(Json(json!({
        "success": true,
        "provider": provider,
    })))
}

#[axum::debug_handler]
pub async fn update_provider(
    State(state): State<Arc<AppConfig>>,
    Path(provider_id): Path<Uuid>,
    WithRejection(Json(request), _): WithRejection<Json<UpdateProviderRequest>, AppError>,
) -> Result<Json<Value>, AppError> {
    let service = ProviderService::new(&state);
    let provider = service
        .update_provider(provider_id, request)
        .await
        .map_err(map_provider_error)?;

    Ok(Json(json!({
        "success": true,
        "provider": provider,
    })))
}

#[axum::debug_handler]
pub async fn deactivate_provider(
    State(state): State<Arc<AppConfig>>,
    Path(provider_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = ProviderService::new(&state);
    let provider = service
        .deactivate_provider(provider_id)
        .await
        .map_err(map_provider_error)?;

    Ok(Json(json!({
        "success": true,
        "provider": provider,
        "message": "Provider deactivated"
    })))
}

#[axum::debug_handler]
pub async fn get_weekly_hours(
    State(state): State<Arc<AppConfig>>,
    Path(provider_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = ScheduleService::new(&state);
    let hours = service
        .get_weekly_hours(provider_id)
        .await
        .map_err(map_provider_error)?;

    Ok(Json(json!({ "hours": hours })))
}

#[axum::debug_handler]
pub async fn upsert_hours(
    State(state): State<Arc<AppConfig>>,
    Path(provider_id): Path<Uuid>,
    WithRejection(Json(request), _): WithRejection<Json<UpsertHoursRequest>, AppError>,
) -> Result<Json<Value>, AppError> {
    let service = ScheduleService::new(&state);
    let hours = service
        .upsert_hours(provider_id, request)
        .await
        .map_err(map_provider_error)?;

    Ok(Json(json!({
        "success": true,
        "hours": hours,
    })))
}

#[axum::debug_handler]
pub async fn list_time_off(
    State(state): State<Arc<AppConfig>>,
    Path(provider_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = ScheduleService::new(&state);
    let entries = service
        .list_time_off(provider_id)
        .await
        .map_err(map_provider_error)?;

    Ok(Json(json!({ "time_off": entries })))
}

#[axum::debug_handler]
pub async fn create_time_off(
    State(state): State<Arc<AppConfig>>,
    Path(provider_id): Path<Uuid>,
    WithRejection(Json(request), _): WithRejection<Json<CreateTimeOffRequest>, AppError>,
) -> Result<Json<Value>, AppError> {
    let service = ScheduleService::new(&state);
    let entry = service
        .create_time_off(provider_id, request)
        .await
        .map_err(map_provider_error)?;

    Ok(Json(json!({
        "success": true,
        "time_off": entry,
    })))
}

#[axum::debug_handler]
pub async fn delete_time_off(
    State(state): State<Arc<AppConfig>>,
    Path((_provider_id, time_off_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Value>, AppError> {
    let service = ScheduleService::new(&state);
    service
        .delete_time_off(time_off_id)
        .await
        .map_err(map_provider_error)?;

    Ok(Json(json!({
        "success": true,
        "message": "Time off removed"
    })))
}
