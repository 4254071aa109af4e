use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use sqlx::PgPool;

use crate::calendar::{days_in_month, month_bounds, YearMonth};
use crate::error::CalendarResult;
use crate::models::{Booking, FormattedBooking};

/// Bookings keyed by `YYYY-MM-DD`. Only days with bookings have a key.
pub type GroupedBookings = BTreeMap<String, Vec<FormattedBooking>>;

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarData {
    pub days: Vec<NaiveDate>,
    pub bookings: GroupedBookings,
}

/// Read access to stored bookings.
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// All bookings with `start <= booked_time <= end`, each carrying its
    /// service and customer names.
    async fn bookings_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> CalendarResult<Vec<Booking>>;
}

pub struct PgBookingStore {
    pool: PgPool,
}

impl PgBookingStore {
    pub fn new(pool: PgPool) -> Self {
        PgBookingStore { pool }
    }
}

#[async_trait]
impl BookingStore for PgBookingStore {
    async fn bookings_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> CalendarResult<Vec<Booking>> {
        let bookings = sqlx::query_as::<_, Booking>(
            r#"
            SELECT
                b.id,
                b.booked_time,
                s.name AS service_name,
                c.name AS customer_name
            FROM bookings b
            JOIN services s ON b.service_id = s.id
            JOIN customers c ON b.customer_id = c.id
            WHERE b.booked_time >= $1
            AND b.booked_time <= $2
            ORDER BY b.id
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(bookings)
    }
}

pub async fn fetch_bookings<Tz: TimeZone>(
    store: &dyn BookingStore,
    year_month: YearMonth,
    tz: &Tz,
) -> CalendarResult<Vec<Booking>> {
    let range = month_bounds(year_month, tz)?;
    debug!(
        "fetching bookings for {}-{:02} between {} and {}",
        year_month.year, year_month.month, range.start, range.end
    );
    let bookings = store.bookings_between(range.start, range.end).await?;
    debug!("found {} bookings", bookings.len());
    Ok(bookings)
}

/// Buckets bookings by their calendar day in `tz`, keeping input order
/// inside each day.
pub fn group_bookings<Tz: TimeZone>(bookings: &[Booking], tz: &Tz) -> GroupedBookings
where
    Tz::Offset: std::fmt::Display,
{
    let mut grouped = GroupedBookings::new();
    for booking in bookings {
        let local = booking.booked_time.with_timezone(tz);
        grouped
            .entry(local.format("%Y-%m-%d").to_string())
            .or_default()
            .push(FormattedBooking {
                time: local.format("%H:%M").to_string(),
                service: booking.service_name.clone(),
                customer: booking.customer_name.clone(),
            });
    }
    grouped
}

pub async fn get_calendar_data<Tz: TimeZone>(
    store: &dyn BookingStore,
    year_month: YearMonth,
    tz: &Tz,
) -> CalendarResult<CalendarData>
where
    Tz::Offset: std::fmt::Display,
{
    let bookings = fetch_bookings(store, year_month, tz).await?;
    Ok(CalendarData {
        days: days_in_month(year_month),
        bookings: group_bookings(&bookings, tz),
    })
}

pub fn date_key(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}
