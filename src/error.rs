use thiserror::Error;

#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("telegram request failed: {0}")]
    Telegram(#[from] teloxide::RequestError),

    #[error("invalid month {month} for year {year}")]
    InvalidMonth { year: i32, month: u32 },

    #[error("configuration error: {0}")]
    Config(String),
}

impl CalendarError {
    pub fn missing_env(var_name: &str) -> Self {
        CalendarError::Config(format!("{} environment variable must be set", var_name))
    }
}

pub type CalendarResult<T> = Result<T, CalendarError>;
