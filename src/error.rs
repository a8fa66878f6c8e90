use chrono::{DateTime, Utc};
use thiserror::Error;

pub type TimelineResult<T> = Result<T, TimelineError>;

#[derive(Debug, Error)]
pub enum TimelineError {
    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("invalid time range: begin={begin}, end={end}")]
    InvalidRange {
        begin: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("timeline has no series loaded")]
    NotInitialized,

    #[error("unknown metric: {0}")]
    UnknownMetric(String),

    #[error("fetch failed: {0}")]
    Fetch(String),

    #[error("malformed backend payload: {0}")]
    Decode(String),
}
