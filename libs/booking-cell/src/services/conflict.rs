// libs/booking-cell/src/services/conflict.rs
use chrono::{Datelike, Duration, NaiveDate, NaiveTime};
use reqwest::Method;
use shared_config::AppConfig;
use shared_database::PostgrestClient;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::models::{Appointment, BookingError};
use crate::services::availability::intervals_overlap;
use crate::services::holidays::is_public_holiday;
use provider_cell::services::ScheduleService;

/// Non-cancelled appointments for a provider on one date, ordered by start
/// time. `exclude` drops one appointment from the result, used when checking
/// a reschedule against everything but the appointment being moved.
pub(crate) async fn blocking_appointments_for_date(
    db: &PostgrestClient,
    provider_id: Uuid,
    date: NaiveDate,
    exclude: Option<Uuid>,
) -> Result<Vec<Appointment>, BookingError> {
    let mut path = format!(
        "/rest/v1/appointments?provider_id=eq.{}&date=eq.{}&status=neq.cancelled&order=start_time.asc",
        provider_id, date
    );
    if let Some(excluded_id) = exclude {
        path.push_str(&format!("&id=neq.{}", excluded_id));
    }

    db.request(Method::GET, &path, None)
        .await
        .map_err(|e| BookingError::DatabaseError(e.to_string()))
}

pub struct ConflictService {
    db: Arc<PostgrestClient>,
    schedule: ScheduleService,
}

impl ConflictService {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_client(Arc::new(PostgrestClient::new(config)))
    }

    pub fn with_client(db: Arc<PostgrestClient>) -> Self {
        Self {
            schedule: ScheduleService::with_client(db.clone()),
            db,
        }
    }

    /// Verify a candidate slot can be booked, with a specific error for each
    /// way it cannot. Unlike the availability listing, callers here asked for
    /// one precise slot and deserve to know why it was refused.
    pub async fn check_slot(
        &self,
        provider_id: Uuid,
        date: NaiveDate,
        start_time: NaiveTime,
        duration_minutes: i32,
        exclude: Option<Uuid>,
    ) -> Result<(), BookingError> {
        if is_public_holiday(date) {
            return Err(BookingError::PublicHoliday);
        }

        let on_leave = self
            .schedule
            .is_on_leave(provider_id, date)
            .await
            .map_err(|e| BookingError::DatabaseError(e.to_string()))?;
        if on_leave {
            return Err(BookingError::ProviderOnLeave);
        }

        let weekday = date.weekday().num_days_from_sunday() as i32;
        let hours = self
            .schedule
            .hours_for_weekday(provider_id, weekday)
            .await
            .map_err(|e| BookingError::DatabaseError(e.to_string()))?;
        let windows = match hours {
            Some(hours) => hours.windows(),
            None => vec![],
        };
        if windows.is_empty() {
            return Err(BookingError::ClosedDay);
        }

        let end_time = start_time + Duration::minutes(duration_minutes as i64);
        let inside_a_window = windows
            .iter()
            .any(|&(open, close)| start_time >= open && end_time <= close && start_time < end_time);
        if !inside_a_window {
            let described = windows
                .iter()
                .map(|(open, close)| format!("{}-{}", open.format("%H:%M"), close.format("%H:%M")))
                .collect::<Vec<_>>()
                .join(", ");
            return Err(BookingError::OutsideOpeningHours(described));
        }

        let existing = blocking_appointments_for_date(&self.db, provider_id, date, exclude).await?;
        for appointment in &existing {
            let (busy_start, busy_end) = appointment.interval();
            if intervals_overlap(start_time, end_time, busy_start, busy_end) {
                debug!(
                    "Slot {} {} conflicts with appointment {} ({}-{})",
                    date, start_time, appointment.id, busy_start, busy_end
                );
                return Err(BookingError::SlotTaken);
            }
        }

        Ok(())
    }
}
