//! Error types for composing events into an accountant.

use dpacct_event::DpEvent;
use thiserror::Error;

/// Why an event tree could not be composed.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositionErrorDetails {
    /// The subevent the accountant could not handle.
    pub invalid_event: DpEvent,

    /// Human-readable reason.
    pub error_message: String,
}

impl CompositionErrorDetails {
    pub fn new(invalid_event: &DpEvent, error_message: impl Into<String>) -> Self {
        Self {
            invalid_event: invalid_event.clone(),
            error_message: error_message.into(),
        }
    }
}

/// An event was passed to `compose` but is not supported.
#[derive(Debug, Error, Clone, PartialEq)]
#[error(
    "unsupported event: {} caused by subevent {}: {}",
    .event.type_tag(),
    .details.invalid_event.type_tag(),
    .details.error_message
)]
pub struct UnsupportedEventError {
    pub event: DpEvent,
    pub details: CompositionErrorDetails,
}

/// Errors reported by accountant queries.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AccountantError {
    /// The accountant does not offer this query.
    #[error("{0} is not implemented by this accountant")]
    NotImplemented(&'static str),

    /// The query target is outside its valid range.
    #[error("invalid target {name}: {value}")]
    InvalidTarget { name: &'static str, value: f64 },

    #[error(transparent)]
    Unsupported(#[from] UnsupportedEventError),
}
