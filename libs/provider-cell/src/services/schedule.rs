use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime, Utc};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::PostgrestClient;

use crate::models::{
    CreateTimeOffRequest, ProviderError, ProviderHours, TimeOff, UpsertHoursRequest,
};
use crate::services::provider::map_db_error;

pub struct ScheduleService {
    db: Arc<PostgrestClient>,
}

impl ScheduleService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            db: Arc::new(PostgrestClient::new(config)),
        }
    }

    pub fn with_client(db: Arc<PostgrestClient>) -> Self {
        Self { db }
    }

    /// Create or replace the opening hours for one weekday.
    pub async fn upsert_hours(
        &self,
        provider_id: Uuid,
        request: UpsertHoursRequest,
    ) -> Result<ProviderHours, ProviderError> {
        debug!("Upserting hours for provider {} weekday {}", provider_id, request.weekday);

        validate_hours(&request)?;

        let now = Utc::now();
        let hours_data = json!({
            "provider_id": provider_id,
            "weekday": request.weekday,
            "morning_start": request.morning_start.map(fmt_time),
            "morning_end": request.morning_end.map(fmt_time),
            "afternoon_start": request.afternoon_start.map(fmt_time),
            "afternoon_end": request.afternoon_end.map(fmt_time),
            "is_closed": request.is_closed.unwrap_or(false),
            "updated_at": now.to_rfc3339(),
        });

        // One row per (provider, weekday); replace any existing row.
        let existing = self.hours_for_weekday(provider_id, request.weekday).await?;
        let result: Vec<ProviderHours> = if let Some(current) = existing {
            let path = format!("/rest/v1/provider_hours?id=eq.{}", current.id);
            self.db
                .update_returning(&path, hours_data)
                .await
                .map_err(map_db_error)?
        } else {
            self.db
                .insert_returning("/rest/v1/provider_hours", hours_data)
                .await
                .map_err(map_db_error)?
        };

        result
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::DatabaseError("Failed to store opening hours".to_string()))
    }

    /// Full weekly schedule, ordered by weekday.
    pub async fn get_weekly_hours(&self, provider_id: Uuid) -> Result<Vec<ProviderHours>, ProviderError> {
        let path = format!(
            "/rest/v1/provider_hours?provider_id=eq.{}&order=weekday.asc",
            provider_id
        );
        let hours: Vec<ProviderHours> = self
            .db
            .request(Method::GET, &path, None)
            .await
            .map_err(map_db_error)?;

        Ok(hours)
    }

    pub async fn hours_for_weekday(
        &self,
        provider_id: Uuid,
        weekday: i32,
    ) -> Result<Option<ProviderHours>, ProviderError> {
        let path = format!(
            "/rest/v1/provider_hours?provider_id=eq.{}&weekday=eq.{}",
            provider_id, weekday
        );
        let hours: Vec<ProviderHours> = self
            .db
            .request(Method::GET, &path, None)
            .await
            .map_err(map_db_error)?;

        Ok(hours.into_iter().next())
    }

    pub async fn create_time_off(
        &self,
        provider_id: Uuid,
        request: CreateTimeOffRequest,
    ) -> Result<TimeOff, ProviderError> {
        debug!(
            "Creating time off for provider {}: {} to {}",
            provider_id, request.start_date, request.end_date
        );

        if request.start_date > request.end_date {
            return Err(ProviderError::Validation(
                "Time off start date must not be after end date".to_string(),
            ));
        }

        // Reject ranges that overlap an existing one.
        let existing = self.list_time_off(provider_id).await?;
        for entry in &existing {
            if request.start_date <= entry.end_date && request.end_date >= entry.start_date {
                return Err(ProviderError::ScheduleConflict(format!(
                    "overlaps time off from {} to {}",
                    entry.start_date, entry.end_date
                )));
            }
        }

        let time_off_data = json!({
            "provider_id": provider_id,
            "start_date": request.start_date,
            "end_date": request.end_date,
            "reason": request.reason,
            "created_at": Utc::now().to_rfc3339(),
        });

        let result: Vec<TimeOff> = self
            .db
            .insert_returning("/rest/v1/provider_time_off", time_off_data)
            .await
            .map_err(map_db_error)?;

        let entry = result
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::DatabaseError("Failed to create time off".to_string()))?;

        info!("Time off {} created for provider {}", entry.id, provider_id);
        Ok(entry)
    }

    pub async fn list_time_off(&self, provider_id: Uuid) -> Result<Vec<TimeOff>, ProviderError> {
        let path = format!(
            "/rest/v1/provider_time_off?provider_id=eq.{}&order=start_date.asc",
            provider_id
        );
        let entries: Vec<TimeOff> = self
            .db
            .request(Method::GET, &path, None)
            .await
            .map_err(map_db_error)?;

        Ok(entries)
    }

    pub async fn delete_time_off(&self, time_off_id: Uuid) -> Result<(), ProviderError> {
        let path = format!("/rest/v1/provider_time_off?id=eq.{}", time_off_id);
        let _: Vec<Value> = self
            .db
            .request(Method::DELETE, &path, None)
            .await
            .map_err(map_db_error)?;

        Ok(())
    }

    /// Whether the provider takes no bookings on the given date.
    pub async fn is_on_leave(&self, provider_id: Uuid, date: NaiveDate) -> Result<bool, ProviderError> {
        let path = format!(
            "/rest/v1/provider_time_off?provider_id=eq.{}&start_date=lte.{}&end_date=gte.{}",
            provider_id, date, date
        );
        let entries: Vec<TimeOff> = self
            .db
            .request(Method::GET, &path, None)
            .await
            .map_err(map_db_error)?;

        Ok(!entries.is_empty())
    }
}

fn fmt_time(t: NaiveTime) -> String {
    t.format("%H:%M:%S").to_string()
}

/// Window sanity checks shared by create and update.
pub fn validate_hours(request: &UpsertHoursRequest) -> Result<(), ProviderError> {
    if request.weekday < 0 || request.weekday > 6 {
        return Err(ProviderError::Validation(
            "Weekday must be between 0 (Sunday) and 6 (Saturday)".to_string(),
        ));
    }

    let morning = match (request.morning_start, request.morning_end) {
        (Some(start), Some(end)) => {
            if start >= end {
                return Err(ProviderError::Validation(
                    "Morning start must be before morning end".to_string(),
                ));
            }
            Some((start, end))
        }
        (None, None) => None,
        _ => {
            return Err(ProviderError::Validation(
                "Morning window requires both start and end".to_string(),
            ));
        }
    };

    let afternoon = match (request.afternoon_start, request.afternoon_end) {
        (Some(start), Some(end)) => {
            if start >= end {
                return Err(ProviderError::Validation(
                    "Afternoon start must be before afternoon end".to_string(),
                ));
            }
            Some((start, end))
        }
        (None, None) => None,
        _ => {
            return Err(ProviderError::Validation(
                "Afternoon window requires both start and end".to_string(),
            ));
        }
    };

    if let (Some((_, morning_end)), Some((afternoon_start, _))) = (morning, afternoon) {
        if morning_end > afternoon_start {
            return Err(ProviderError::Validation(
                "Morning window must end before the afternoon window starts".to_string(),
            ));
        }
    }

    Ok(())
}
