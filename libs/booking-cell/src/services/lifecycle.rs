// libs/booking-cell/src/services/lifecycle.rs
use crate::models::{AppointmentStatus, BookingError};

/// Status transition rules for appointments.
///
/// pending -> confirmed | cancelled
/// confirmed -> completed | cancelled | no_show
/// cancelled, completed and no_show are terminal.
pub struct LifecycleService;

impl LifecycleService {
    pub fn new() -> Self {
        Self
    }

    pub fn validate_transition(
        &self,
        current: AppointmentStatus,
        next: AppointmentStatus,
    ) -> Result<(), BookingError> {
        use AppointmentStatus::*;

        let allowed = match (current, next) {
            (Pending, Confirmed) | (Pending, Cancelled) => true,
            (Confirmed, Completed) | (Confirmed, Cancelled) | (Confirmed, NoShow) => true,
            _ => false,
        };

        if allowed {
            Ok(())
        } else {
            Err(BookingError::InvalidStatusTransition(current))
        }
    }

    /// Whether an appointment in this status can still be rescheduled.
    pub fn can_reschedule(&self, status: AppointmentStatus) -> bool {
        matches!(
            status,
            AppointmentStatus::Pending | AppointmentStatus::Confirmed
        )
    }
}

impl Default for LifecycleService {
    fn default() -> Self {
        Self::new()
    }
}
