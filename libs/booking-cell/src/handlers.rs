// libs/booking-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use axum_extra::extract::WithRejection;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{
    AppointmentSearchQuery, AppointmentStatus, BookAppointmentRequest, BookingError,
    CancelAppointmentRequest, RescheduleAppointmentRequest, UpdateStatusRequest,
    ALLOWED_STEP_MINUTES,
};
use crate::services::{AvailabilityService, BookingService};

fn map_booking_error(e: BookingError) -> AppError {
    match e {
        BookingError::NotFound => AppError::NotFound("Appointment not found".to_string()),
        BookingError::ProviderNotFound => AppError::NotFound("Provider not found".to_string()),
        BookingError::ServiceNotFound => AppError::NotFound("Service not found".to_string()),
        BookingError::PublicHoliday
        | BookingError::ProviderOnLeave
        | BookingError::ClosedDay
        | BookingError::SlotTaken => AppError::Conflict(e.to_string()),
        BookingError::OutsideOpeningHours(_) => AppError::Conflict(e.to_string()),
        BookingError::InvalidStatusTransition(_) => AppError::Conflict(e.to_string()),
        BookingError::InvalidTime(msg) => AppError::BadRequest(msg),
        BookingError::Validation(msg) => AppError::ValidationError(msg),
        BookingError::DatabaseError(msg) => AppError::Database(msg),
    }
}

#[derive(Debug, Deserialize)]
pub struct SlotQuery {
    pub provider_id: Uuid,
    pub service_id: Uuid,
    pub date: NaiveDate,
    pub step_minutes: Option<i32>,
}

/// Public availability listing: the booking form's main read.
#[axum::debug_handler]
pub async fn get_available_slots(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<SlotQuery>,
) -> Result<Json<Value>, AppError> {
    if let Some(step) = query.step_minutes {
        if !ALLOWED_STEP_MINUTES.contains(&step) {
            return Err(AppError::BadRequest(format!(
                "step_minutes must be one of {:?}",
                ALLOWED_STEP_MINUTES
            )));
        }
    }

    let service = AvailabilityService::new(&state);
    let slots = service
        .get_available_slots(query.provider_id, query.service_id, query.date, query.step_minutes)
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!({
        "date": query.date,
        "provider_id": query.provider_id,
        "service_id": query.service_id,
        "slots": slots,
    })))
}

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<AppConfig>>,
    WithRejection(Json(request), _): WithRejection<Json<BookAppointmentRequest>, AppError>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);
    let appointment = service
        .book_appointment(request)
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
    })))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);
    let appointment = service
        .get_appointment(appointment_id)
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    WithRejection(Json(request), _): WithRejection<Json<CancelAppointmentRequest>, AppError>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);
    let appointment = service
        .cancel_appointment(appointment_id, request)
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
    })))
}

#[axum::debug_handler]
pub async fn reschedule_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    WithRejection(Json(request), _): WithRejection<Json<RescheduleAppointmentRequest>, AppError>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);
    let appointment = service
        .reschedule_appointment(appointment_id, request)
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
    })))
}

/// Admin shortcut for the most common transition.
#[axum::debug_handler]
pub async fn confirm_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);
    let appointment = service
        .update_status(appointment_id, AppointmentStatus::Confirmed, None)
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
    })))
}

/// Admin status change: confirm, complete, mark no-show.
#[axum::debug_handler]
pub async fn update_status(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    WithRejection(Json(request), _): WithRejection<Json<UpdateStatusRequest>, AppError>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);
    let appointment = service
        .update_status(appointment_id, request.status, request.note)
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
    })))
}

#[axum::debug_handler]
pub async fn search_appointments(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<AppointmentSearchQuery>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);
    let appointments = service
        .search_appointments(query)
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!({ "appointments": appointments })))
}

#[derive(Debug, Deserialize)]
pub struct DayQuery {
    pub provider_id: Uuid,
    pub date: NaiveDate,
}

/// Admin day view: every appointment for a provider on one date,
/// cancelled ones included.
#[axum::debug_handler]
pub async fn day_appointments(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<DayQuery>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);
    let appointments = service
        .day_appointments(query.provider_id, query.date)
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!({
        "date": query.date,
        "provider_id": query.provider_id,
        "appointments": appointments,
    })))
}
