use chrono::{DateTime, Utc};
use thiserror::Error;

/// Everything that can go wrong while parsing, validating or expanding a rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Rule text violates the grammar or a field's declared range.
    #[error("invalid {field} value {raw:?}")]
    Parse { field: String, raw: String },

    /// Well-formed rule whose fields contradict each other.
    #[error("invalid recurrence rule: {reason}")]
    Validation { reason: String },

    #[error("time range ends at {end} before it starts at {start}")]
    TimeRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// More occurrences fall inside the window than the caller allowed.
    #[error("expansion exceeded the limit of {cap} instances")]
    ResourceExceeded { cap: usize },

    #[error("event {id} not found")]
    NotFound { id: String },
}

impl Error {
    pub(crate) fn parse(field: impl Into<String>, raw: impl Into<String>) -> Self {
        Error::Parse {
            field: field.into(),
            raw: raw.into(),
        }
    }

    pub(crate) fn validation(reason: impl Into<String>) -> Self {
        Error::Validation {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
