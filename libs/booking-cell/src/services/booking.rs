// libs/booking-cell/src/services/booking.rs
use chrono::{Duration, NaiveDateTime, Utc};
use reqwest::Method;
use serde_json::json;
use shared_config::AppConfig;
use shared_database::{DbError, PostgrestClient};
use shared_utils::validation::{validate_email, validate_phone};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::{
    Appointment, AppointmentSearchQuery, AppointmentStatus, BookAppointmentRequest, BookingError,
    BookingRules, CancelAppointmentRequest, CancelledBy, RescheduleAppointmentRequest,
};
use crate::services::conflict::ConflictService;
use crate::services::lifecycle::LifecycleService;
use catalog_cell::models::{CatalogError, Service};
use catalog_cell::services::CatalogService;
use notification_cell::services::templates::{
    self, AppointmentMailContext,
};
use notification_cell::services::{MailerClient, NoopNotifier, Notifier};
use provider_cell::models::{Provider, ProviderError};
use provider_cell::services::ProviderService;

pub struct BookingService {
    db: Arc<PostgrestClient>,
    providers: ProviderService,
    catalog: CatalogService,
    conflict: ConflictService,
    lifecycle: LifecycleService,
    notifier: Arc<dyn Notifier>,
    rules: BookingRules,
}

impl BookingService {
    pub fn new(config: &AppConfig) -> Self {
        let notifier: Arc<dyn Notifier> = if config.is_mailer_configured() {
            Arc::new(MailerClient::new(config))
        } else {
            Arc::new(NoopNotifier)
        };
        Self::with_parts(Arc::new(PostgrestClient::new(config)), notifier)
    }

    pub fn with_parts(db: Arc<PostgrestClient>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            providers: ProviderService::with_client(db.clone()),
            catalog: CatalogService::with_client(db.clone()),
            conflict: ConflictService::with_client(db.clone()),
            lifecycle: LifecycleService::new(),
            notifier,
            rules: BookingRules::default(),
            db,
        }
    }

    /// Book a new appointment.
    ///
    /// Runs the full pipeline: field validation, service and provider lookup,
    /// slot conflict check, then insert. The appointments table carries a
    /// unique constraint on (provider_id, date, start_time), so two requests
    /// racing for the same slot cannot both succeed; the loser's insert
    /// comes back as a row conflict and is reported as a taken slot.
    pub async fn book_appointment(
        &self,
        request: BookAppointmentRequest,
    ) -> Result<Appointment, BookingError> {
        self.validate_booking_fields(&request)?;

        let service = self.get_active_service(request.service_id).await?;
        let provider = self.get_active_provider(request.provider_id).await?;

        self.validate_timing(request.date, request.start_time)?;

        self.conflict
            .check_slot(
                request.provider_id,
                request.date,
                request.start_time,
                service.duration_minutes,
                None,
            )
            .await?;

        let body = json!({
            "provider_id": request.provider_id,
            "service_id": request.service_id,
            "customer_name": request.customer_name.trim(),
            "customer_email": request.customer_email.trim().to_lowercase(),
            "customer_phone": request.customer_phone,
            "date": request.date,
            "start_time": request.start_time,
            "duration_minutes": service.duration_minutes,
            "status": AppointmentStatus::Pending,
            "notes": request.notes,
        });

        let created: Vec<Appointment> = self
            .db
            .insert_returning("/rest/v1/appointments", body)
            .await
            .map_err(map_insert_error)?;
        let appointment = created
            .into_iter()
            .next()
            .ok_or_else(|| BookingError::DatabaseError("Insert returned no row".to_string()))?;

        info!(
            "Booked appointment {} for provider {} on {} at {}",
            appointment.id, appointment.provider_id, appointment.date, appointment.start_time
        );

        let ctx = mail_context(&appointment, &provider, &service);
        self.send_best_effort(templates::booking_confirmation_for_customer(&ctx))
            .await;
        self.send_best_effort(templates::booking_confirmation_for_provider(&ctx))
            .await;

        Ok(appointment)
    }

    pub async fn get_appointment(&self, appointment_id: Uuid) -> Result<Appointment, BookingError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let rows: Vec<Appointment> = self
            .db
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| BookingError::DatabaseError(e.to_string()))?;
        rows.into_iter().next().ok_or(BookingError::NotFound)
    }

    /// Move an existing appointment to a new slot. The appointment's own row
    /// is excluded from the conflict check so moving within overlap of itself
    /// is allowed.
    pub async fn reschedule_appointment(
        &self,
        appointment_id: Uuid,
        request: RescheduleAppointmentRequest,
    ) -> Result<Appointment, BookingError> {
        let current = self.get_appointment(appointment_id).await?;
        if !self.lifecycle.can_reschedule(current.status) {
            return Err(BookingError::InvalidStatusTransition(current.status));
        }

        let new_date = request.new_date.unwrap_or(current.date);
        self.validate_timing(new_date, request.new_start_time)?;

        self.conflict
            .check_slot(
                current.provider_id,
                new_date,
                request.new_start_time,
                current.duration_minutes,
                Some(appointment_id),
            )
            .await?;

        let mut body = json!({
            "date": new_date,
            "start_time": request.new_start_time,
            "updated_at": Utc::now(),
        });
        if let Some(reason) = &request.reason {
            let note = append_note(
                current.notes.as_deref(),
                &format!("Rescheduled: {}", reason.trim()),
            );
            body["notes"] = json!(note);
        }

        let updated = self.patch_appointment(appointment_id, body).await?;

        info!(
            "Rescheduled appointment {} to {} at {}",
            appointment_id, updated.date, updated.start_time
        );

        if let Ok(ctx) = self.load_mail_context(&updated).await {
            self.send_best_effort(templates::reschedule_for_customer(&ctx))
                .await;
            self.send_best_effort(templates::reschedule_for_provider(&ctx))
                .await;
        }

        Ok(updated)
    }

    pub async fn cancel_appointment(
        &self,
        appointment_id: Uuid,
        request: CancelAppointmentRequest,
    ) -> Result<Appointment, BookingError> {
        if request.reason.trim().is_empty() {
            return Err(BookingError::Validation(
                "Cancellation reason is required".to_string(),
            ));
        }

        let current = self.get_appointment(appointment_id).await?;
        self.lifecycle
            .validate_transition(current.status, AppointmentStatus::Cancelled)?;

        let by = match request.cancelled_by {
            CancelledBy::Customer => "customer",
            CancelledBy::Provider => "provider",
            CancelledBy::Admin => "admin",
        };
        let note = append_note(
            current.notes.as_deref(),
            &format!("Cancelled by {}: {}", by, request.reason.trim()),
        );

        let body = json!({
            "status": AppointmentStatus::Cancelled,
            "notes": note,
            "updated_at": Utc::now(),
        });
        let updated = self.patch_appointment(appointment_id, body).await?;

        info!("Cancelled appointment {} ({})", appointment_id, by);

        if let Ok(ctx) = self.load_mail_context(&updated).await {
            self.send_best_effort(templates::cancellation_for_customer(&ctx, &request.reason))
                .await;
            self.send_best_effort(templates::cancellation_for_provider(&ctx, &request.reason))
                .await;
        }

        Ok(updated)
    }

    /// Admin status changes: confirm, complete, mark no-show.
    pub async fn update_status(
        &self,
        appointment_id: Uuid,
        new_status: AppointmentStatus,
        note: Option<String>,
    ) -> Result<Appointment, BookingError> {
        if new_status == AppointmentStatus::Cancelled {
            return Err(BookingError::Validation(
                "Use the cancellation endpoint to cancel".to_string(),
            ));
        }

        let current = self.get_appointment(appointment_id).await?;
        self.lifecycle
            .validate_transition(current.status, new_status)?;

        let mut body = json!({
            "status": new_status,
            "updated_at": Utc::now(),
        });
        if let Some(note) = note {
            body["notes"] = json!(append_note(current.notes.as_deref(), note.trim()));
        }

        let updated = self.patch_appointment(appointment_id, body).await?;
        info!(
            "Appointment {} moved from {} to {}",
            appointment_id, current.status, new_status
        );
        Ok(updated)
    }

    pub async fn search_appointments(
        &self,
        query: AppointmentSearchQuery,
    ) -> Result<Vec<Appointment>, BookingError> {
        let mut path = String::from("/rest/v1/appointments?order=date.asc,start_time.asc");

        if let Some(provider_id) = query.provider_id {
            path.push_str(&format!("&provider_id=eq.{}", provider_id));
        }
        if let Some(service_id) = query.service_id {
            path.push_str(&format!("&service_id=eq.{}", service_id));
        }
        if let Some(status) = query.status {
            path.push_str(&format!("&status=eq.{}", status));
        }
        if let Some(email) = &query.customer_email {
            path.push_str(&format!(
                "&customer_email=eq.{}",
                urlencoding::encode(&email.trim().to_lowercase())
            ));
        }
        if let Some(from) = query.from_date {
            path.push_str(&format!("&date=gte.{}", from));
        }
        if let Some(to) = query.to_date {
            path.push_str(&format!("&date=lte.{}", to));
        }

        let limit = query.limit.unwrap_or(50).clamp(1, 200);
        let offset = query.offset.unwrap_or(0).max(0);
        path.push_str(&format!("&limit={}&offset={}", limit, offset));

        self.db
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| BookingError::DatabaseError(e.to_string()))
    }

    /// A provider's full day, cancelled appointments included. Backs the
    /// admin day view.
    pub async fn day_appointments(
        &self,
        provider_id: Uuid,
        date: chrono::NaiveDate,
    ) -> Result<Vec<Appointment>, BookingError> {
        let path = format!(
            "/rest/v1/appointments?provider_id=eq.{}&date=eq.{}&order=start_time.asc",
            provider_id, date
        );
        self.db
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| BookingError::DatabaseError(e.to_string()))
    }

    // ==========================================================================
    // INTERNAL HELPERS
    // ==========================================================================

    fn validate_booking_fields(&self, request: &BookAppointmentRequest) -> Result<(), BookingError> {
        if request.customer_name.trim().is_empty() {
            return Err(BookingError::Validation(
                "Customer name is required".to_string(),
            ));
        }
        if !validate_email(request.customer_email.trim()) {
            return Err(BookingError::Validation(
                "Invalid customer email".to_string(),
            ));
        }
        if let Some(phone) = &request.customer_phone {
            if !phone.trim().is_empty() && !validate_phone(phone.trim()) {
                return Err(BookingError::Validation(
                    "Invalid customer phone number".to_string(),
                ));
            }
        }
        if let Some(notes) = &request.notes {
            if notes.len() > 2000 {
                return Err(BookingError::Validation(
                    "Notes must be 2000 characters or fewer".to_string(),
                ));
            }
        }
        Ok(())
    }

    fn validate_timing(
        &self,
        date: chrono::NaiveDate,
        start_time: chrono::NaiveTime,
    ) -> Result<(), BookingError> {
        let now = Utc::now().naive_utc();
        let starts_at = NaiveDateTime::new(date, start_time);

        if starts_at < now + Duration::minutes(self.rules.min_advance_minutes) {
            return Err(BookingError::InvalidTime(format!(
                "Appointments must be booked at least {} minutes in advance",
                self.rules.min_advance_minutes
            )));
        }
        if starts_at > now + Duration::days(self.rules.max_advance_days) {
            return Err(BookingError::InvalidTime(format!(
                "Appointments cannot be booked more than {} days ahead",
                self.rules.max_advance_days
            )));
        }
        Ok(())
    }

    async fn get_active_service(&self, service_id: Uuid) -> Result<Service, BookingError> {
        let service = self.catalog.get_service(service_id).await.map_err(|e| match e {
            CatalogError::NotFound => BookingError::ServiceNotFound,
            other => BookingError::DatabaseError(other.to_string()),
        })?;
        if !service.is_active {
            return Err(BookingError::ServiceNotFound);
        }
        Ok(service)
    }

    async fn get_active_provider(&self, provider_id: Uuid) -> Result<Provider, BookingError> {
        let provider = self
            .providers
            .get_provider(provider_id)
            .await
            .map_err(|e| match e {
                ProviderError::NotFound => BookingError::ProviderNotFound,
                other => BookingError::DatabaseError(other.to_string()),
            })?;
        if !provider.is_active {
            return Err(BookingError::ProviderNotFound);
        }
        Ok(provider)
    }

    async fn patch_appointment(
        &self,
        appointment_id: Uuid,
        body: serde_json::Value,
    ) -> Result<Appointment, BookingError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let rows: Vec<Appointment> = self
            .db
            .update_returning(&path, body)
            .await
            .map_err(|e| match e {
                DbError::NotFound(_) => BookingError::NotFound,
                other => BookingError::DatabaseError(other.to_string()),
            })?;
        rows.into_iter().next().ok_or(BookingError::NotFound)
    }

    async fn load_mail_context(
        &self,
        appointment: &Appointment,
    ) -> Result<AppointmentMailContext, BookingError> {
        let provider = self.get_active_provider(appointment.provider_id).await?;
        let service = self.get_active_service(appointment.service_id).await?;
        Ok(mail_context(appointment, &provider, &service))
    }

    async fn send_best_effort(&self, message: notification_cell::models::EmailMessage) {
        if let Err(e) = self.notifier.send(&message).await {
            warn!("Failed to send notification to {}: {}", message.to, e);
        } else {
            debug!("Notification sent to {}", message.to);
        }
    }
}

fn mail_context(
    appointment: &Appointment,
    provider: &Provider,
    service: &Service,
) -> AppointmentMailContext {
    AppointmentMailContext {
        customer_name: appointment.customer_name.clone(),
        customer_email: appointment.customer_email.clone(),
        provider_name: provider.name.clone(),
        provider_email: provider.email.clone(),
        service_name: service.name.clone(),
        date: appointment.date,
        start_time: appointment.start_time,
        end_time: appointment.end_time(),
    }
}

fn append_note(existing: Option<&str>, addition: &str) -> String {
    match existing {
        Some(existing) if !existing.trim().is_empty() => format!("{}\n{}", existing, addition),
        _ => addition.to_string(),
    }
}

fn map_insert_error(error: DbError) -> BookingError {
    match error {
        DbError::Conflict(_) => BookingError::SlotTaken,
        other => BookingError::DatabaseError(other.to_string()),
    }
}
