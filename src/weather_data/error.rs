use crate::clock::error::SerialClockError;
use crate::error::ErrorKind;
use crate::transport::TransportError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WeatherDataError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Observation table '{selector}' not found in the page for {url}")]
    TableNotFound { url: String, selector: String },

    #[error("Invalid CSS selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Invalid observation URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Invalid station id '{0}'")]
    InvalidStationId(String),

    #[error(transparent)]
    Date(#[from] SerialClockError),

    #[error("Range starts at {start} but ends earlier, at {end}")]
    ReversedRange { start: String, end: String },
}

impl WeatherDataError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WeatherDataError::Transport(_)
            | WeatherDataError::HttpStatus { .. }
            | WeatherDataError::TableNotFound { .. } => ErrorKind::UpstreamError,
            WeatherDataError::InvalidSelector { .. }
            | WeatherDataError::InvalidUrl { .. }
            | WeatherDataError::InvalidStationId(_) => ErrorKind::InvalidInput,
            WeatherDataError::Date(e) => e.kind(),
            WeatherDataError::ReversedRange { .. } => ErrorKind::InconsistentDateRange,
        }
    }
}
