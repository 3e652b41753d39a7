// libs/booking-cell/src/services/availability.rs
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use shared_config::AppConfig;
use shared_database::PostgrestClient;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::models::{AvailableSlot, BookingError, BookingRules};
use crate::services::conflict::blocking_appointments_for_date;
use crate::services::holidays::is_public_holiday;
use catalog_cell::models::CatalogError;
use catalog_cell::services::CatalogService;
use provider_cell::models::ProviderError;
use provider_cell::services::{ProviderService, ScheduleService};

/// Half-open interval overlap: `[a_start, a_end)` against `[b_start, b_end)`.
///
/// Touching endpoints (one interval ending exactly where the other starts)
/// do not overlap.
pub fn intervals_overlap(
    a_start: NaiveTime,
    a_end: NaiveTime,
    b_start: NaiveTime,
    b_end: NaiveTime,
) -> bool {
    a_start < b_end && b_start < a_end
}

/// Free slots for one day given the opening windows and the busy intervals.
///
/// Candidates are generated inside each window at `step_minutes` increments,
/// starting at the window start; a candidate is kept when it fits entirely
/// inside the window and overlaps none of the busy intervals. Windows that
/// are shorter than the service duration yield nothing.
pub fn compute_free_slots(
    windows: &[(NaiveTime, NaiveTime)],
    busy: &[(NaiveTime, NaiveTime)],
    duration_minutes: i32,
    step_minutes: i32,
) -> Vec<AvailableSlot> {
    let mut slots = Vec::new();
    if duration_minutes <= 0 || step_minutes <= 0 {
        return slots;
    }

    let duration = duration_minutes as u32 * 60;
    let step = step_minutes as u32 * 60;

    for &(window_start, window_end) in windows {
        let window_start_s = window_start.num_seconds_from_midnight();
        let window_end_s = window_end.num_seconds_from_midnight();
        if window_end_s <= window_start_s {
            continue;
        }

        let mut start_s = window_start_s;
        while start_s + duration <= window_end_s {
            let end_s = start_s + duration;
            let start = seconds_to_time(start_s);
            let end = seconds_to_time(end_s);

            let taken = busy
                .iter()
                .any(|&(busy_start, busy_end)| intervals_overlap(start, end, busy_start, busy_end));
            if !taken {
                slots.push(AvailableSlot {
                    start_time: start,
                    end_time: end,
                });
            }

            start_s += step;
        }
    }

    slots.sort_by_key(|slot| slot.start_time);
    slots
}

fn seconds_to_time(seconds: u32) -> NaiveTime {
    NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0)
        .unwrap_or(NaiveTime::MIN)
}

/// Same-day queries only offer slots far enough ahead of `now`. The cutoff
/// is computed on a full datetime: late in the evening it spills into the
/// next day, which leaves nothing bookable today rather than wrapping back
/// to the morning.
pub fn apply_same_day_cutoff(
    slots: &mut Vec<AvailableSlot>,
    date: NaiveDate,
    now: NaiveDateTime,
    min_advance_minutes: i64,
) {
    if date != now.date() {
        return;
    }

    let cutoff = now + Duration::minutes(min_advance_minutes);
    if cutoff.date() != date {
        slots.clear();
        return;
    }
    slots.retain(|slot| slot.start_time >= cutoff.time());
}

pub struct AvailabilityService {
    providers: ProviderService,
    schedule: ScheduleService,
    catalog: CatalogService,
    db: Arc<PostgrestClient>,
    rules: BookingRules,
}

impl AvailabilityService {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_client(Arc::new(PostgrestClient::new(config)))
    }

    pub fn with_client(db: Arc<PostgrestClient>) -> Self {
        Self {
            providers: ProviderService::with_client(db.clone()),
            schedule: ScheduleService::with_client(db.clone()),
            catalog: CatalogService::with_client(db.clone()),
            db,
            rules: BookingRules::default(),
        }
    }

    /// Bookable slots for a provider/service/date combination.
    ///
    /// Holidays, provider leave and closed weekdays all produce an empty
    /// list rather than an error: from the booking form's point of view
    /// those days simply have nothing to offer.
    pub async fn get_available_slots(
        &self,
        provider_id: Uuid,
        service_id: Uuid,
        date: NaiveDate,
        step_minutes: Option<i32>,
    ) -> Result<Vec<AvailableSlot>, BookingError> {
        let step = step_minutes.unwrap_or(self.rules.default_step_minutes);

        let service = self.catalog.get_service(service_id).await.map_err(|e| match e {
            CatalogError::NotFound => BookingError::ServiceNotFound,
            other => BookingError::DatabaseError(other.to_string()),
        })?;
        if !service.is_active {
            return Err(BookingError::ServiceNotFound);
        }

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

        if is_public_holiday(date) {
            debug!("No slots for {}: public holiday", date);
            return Ok(vec![]);
        }

        let on_leave = self
            .schedule
            .is_on_leave(provider_id, date)
            .await
            .map_err(|e| BookingError::DatabaseError(e.to_string()))?;
        if on_leave {
            debug!("No slots for provider {} on {}: time off", provider_id, date);
            return Ok(vec![]);
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
            return Ok(vec![]);
        }

        let appointments =
            blocking_appointments_for_date(&self.db, provider_id, date, None).await?;
        let busy: Vec<(NaiveTime, NaiveTime)> =
            appointments.iter().map(|a| a.interval()).collect();

        let mut slots = compute_free_slots(&windows, &busy, service.duration_minutes, step);

        apply_same_day_cutoff(
            &mut slots,
            date,
            Utc::now().naive_utc(),
            self.rules.min_advance_minutes,
        );

        debug!(
            "Computed {} free slots for provider {} on {} (duration {} min, step {} min)",
            slots.len(),
            provider_id,
            date,
            service.duration_minutes,
            step
        );

        Ok(slots)
    }
}
