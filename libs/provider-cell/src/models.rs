// libs/provider-cell/src/models.rs
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==============================================================================
// CORE PROVIDER MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provider {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One row per weekday (0 = Sunday .. 6 = Saturday).
///
/// A day is open through up to two windows, morning and afternoon; either may
/// be absent. `is_closed` wins over any window that happens to be stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderHours {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub weekday: i32,
    pub morning_start: Option<NaiveTime>,
    pub morning_end: Option<NaiveTime>,
    pub afternoon_start: Option<NaiveTime>,
    pub afternoon_end: Option<NaiveTime>,
    pub is_closed: bool,
    pub updated_at: DateTime<Utc>,
}

impl ProviderHours {
    /// Opening windows for the day, in chronological order.
    pub fn windows(&self) -> Vec<(NaiveTime, NaiveTime)> {
        if self.is_closed {
            return vec![];
        }

        let mut windows = Vec::with_capacity(2);
        if let (Some(start), Some(end)) = (self.morning_start, self.morning_end) {
            windows.push((start, end));
        }
        if let (Some(start), Some(end)) = (self.afternoon_start, self.afternoon_end) {
            windows.push((start, end));
        }
        windows
    }
}

/// Inclusive date range during which the provider takes no bookings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeOff {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TimeOff {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CreateProviderRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProviderRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpsertHoursRequest {
    pub weekday: i32,
    pub morning_start: Option<NaiveTime>,
    pub morning_end: Option<NaiveTime>,
    pub afternoon_start: Option<NaiveTime>,
    pub afternoon_end: Option<NaiveTime>,
    pub is_closed: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTimeOffRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    #[error("Provider not found")]
    NotFound,

    #[error("Schedule entry not found")]
    ScheduleNotFound,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Schedule conflicts with an existing entry: {0}")]
    ScheduleConflict(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}
