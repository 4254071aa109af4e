use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// A booking row joined with the names of its service and customer.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Booking {
    pub id: i32,
    pub booked_time: DateTime<Utc>,
    pub service_name: String,
    pub customer_name: String,
}

/// One line of a calendar day: `HH:MM` plus who booked what.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedBooking {
    pub time: String,
    pub service: String,
    pub customer: String,
}
