use chrono::{NaiveDate, NaiveTime};

use crate::models::EmailMessage;

/// Everything the booking emails need to render.
#[derive(Debug, Clone)]
pub struct AppointmentMailContext {
    pub customer_name: String,
    pub customer_email: String,
    pub provider_name: String,
    pub provider_email: String,
    pub service_name: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl AppointmentMailContext {
    fn when(&self) -> String {
        format!(
            "{} from {} to {}",
            self.date.format("%A %-d %B %Y"),
            self.start_time.format("%H:%M"),
            self.end_time.format("%H:%M")
        )
    }
}

pub fn booking_confirmation_for_customer(ctx: &AppointmentMailContext) -> EmailMessage {
    EmailMessage {
        to: ctx.customer_email.clone(),
        to_name: Some(ctx.customer_name.clone()),
        subject: format!("Appointment confirmed: {}", ctx.service_name),
        text_body: format!(
            "Hello {},\n\n\
             Your appointment is confirmed.\n\n\
             Service: {}\n\
             With: {}\n\
             When: {}\n\n\
             If you need to change or cancel, please contact us as early as possible.\n",
            ctx.customer_name, ctx.service_name, ctx.provider_name, ctx.when()
        ),
    }
}

pub fn booking_confirmation_for_provider(ctx: &AppointmentMailContext) -> EmailMessage {
    EmailMessage {
        to: ctx.provider_email.clone(),
        to_name: Some(ctx.provider_name.clone()),
        subject: format!("New appointment: {}", ctx.service_name),
        text_body: format!(
            "Hello {},\n\n\
             A new appointment has been booked.\n\n\
             Service: {}\n\
             Customer: {} ({})\n\
             When: {}\n",
            ctx.provider_name, ctx.service_name, ctx.customer_name, ctx.customer_email, ctx.when()
        ),
    }
}

pub fn cancellation_for_customer(ctx: &AppointmentMailContext, reason: &str) -> EmailMessage {
    EmailMessage {
        to: ctx.customer_email.clone(),
        to_name: Some(ctx.customer_name.clone()),
        subject: format!("Appointment cancelled: {}", ctx.service_name),
        text_body: format!(
            "Hello {},\n\n\
             Your appointment has been cancelled.\n\n\
             Service: {}\n\
             With: {}\n\
             When: {}\n\
             Reason: {}\n\n\
             You are welcome to book a new appointment at any time.\n",
            ctx.customer_name, ctx.service_name, ctx.provider_name, ctx.when(), reason
        ),
    }
}

pub fn cancellation_for_provider(ctx: &AppointmentMailContext, reason: &str) -> EmailMessage {
    EmailMessage {
        to: ctx.provider_email.clone(),
        to_name: Some(ctx.provider_name.clone()),
        subject: format!("Appointment cancelled: {}", ctx.service_name),
        text_body: format!(
            "Hello {},\n\n\
             An appointment has been cancelled.\n\n\
             Service: {}\n\
             Customer: {}\n\
             When: {}\n\
             Reason: {}\n",
            ctx.provider_name, ctx.service_name, ctx.customer_name, ctx.when(), reason
        ),
    }
}

pub fn reschedule_for_customer(ctx: &AppointmentMailContext) -> EmailMessage {
    EmailMessage {
        to: ctx.customer_email.clone(),
        to_name: Some(ctx.customer_name.clone()),
        subject: format!("Appointment rescheduled: {}", ctx.service_name),
        text_body: format!(
            "Hello {},\n\n\
             Your appointment has been moved.\n\n\
             Service: {}\n\
             With: {}\n\
             New time: {}\n",
            ctx.customer_name, ctx.service_name, ctx.provider_name, ctx.when()
        ),
    }
}

pub fn reschedule_for_provider(ctx: &AppointmentMailContext) -> EmailMessage {
    EmailMessage {
        to: ctx.provider_email.clone(),
        to_name: Some(ctx.provider_name.clone()),
        subject: format!("Appointment rescheduled: {}", ctx.service_name),
        text_body: format!(
            "Hello {},\n\n\
             An appointment has been moved.\n\n\
             Service: {}\n\
             Customer: {}\n\
             New time: {}\n",
            ctx.provider_name, ctx.service_name, ctx.customer_name, ctx.when()
        ),
    }
}
