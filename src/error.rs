use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("invalid input: {field} ({reason})")]
    InvalidInput { field: String, reason: String },

    #[error("{start} plus {months} months is outside the supported date range")]
    DateOutOfRange { start: NaiveDate, months: u32 },

    #[error("invalid date: {0}")]
    InvalidDate(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl ScheduleError {
    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        ScheduleError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<chrono::ParseError> for ScheduleError {
    fn from(e: chrono::ParseError) -> Self {
        ScheduleError::InvalidDate(e.to_string())
    }
}

impl From<serde_json::Error> for ScheduleError {
    fn from(e: serde_json::Error) -> Self {
        ScheduleError::Serialization(e.to_string())
    }
}
