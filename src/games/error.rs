//! Game Report Error Types

use thiserror::Error;

/// Reasons an event body is dropped
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventError {
    #[error("Incomplete event: missing '{0}'")]
    IncompleteEvent(&'static str),

    #[error("Invalid event time: {0}")]
    InvalidTime(String),
}

/// Aggregation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AggregateError {
    #[error("No events recorded for user '{user}' in game '{game}'")]
    NotFound { game: String, user: String },
}

/// Events file loading errors
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

pub type EventResult<T> = Result<T, EventError>;

pub type AggregateResult<T> = Result<T, AggregateError>;
