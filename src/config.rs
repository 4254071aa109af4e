use std::env;

use chrono_tz::Tz;
use dotenvy::dotenv;

use crate::error::{CalendarError, CalendarResult};

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    /// Timezone whose calendar days the bookings are grouped by.
    pub timezone: Tz,
}

impl Config {
    pub fn from_env() -> CalendarResult<Self> {
        dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").map_err(|_| CalendarError::missing_env("DATABASE_URL"))?;

        let max_connections = match env::var("DATABASE_MAX_CONNECTIONS") {
            Ok(raw) => raw.trim().parse().map_err(|_| {
                CalendarError::Config(format!(
                    "DATABASE_MAX_CONNECTIONS must be a positive number, got {:?}",
                    raw
                ))
            })?,
            Err(_) => DEFAULT_MAX_CONNECTIONS,
        };

        let timezone = match env::var("CALENDAR_TIMEZONE") {
            Ok(raw) => parse_timezone(&raw)?,
            Err(_) => chrono_tz::UTC,
        };

        Ok(Config {
            database_url,
            max_connections,
            timezone,
        })
    }
}

fn parse_timezone(raw: &str) -> CalendarResult<Tz> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        warn!("CALENDAR_TIMEZONE is empty, using UTC");
        return Ok(chrono_tz::UTC);
    }
    trimmed
        .parse::<Tz>()
        .map_err(|e| CalendarError::Config(format!("unknown timezone {:?}: {}", trimmed, e)))
}
