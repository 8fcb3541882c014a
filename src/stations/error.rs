use crate::error::ErrorKind;
use crate::transport::TransportError;
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LocateStationError {
    #[error("Invalid station name '{0}'")]
    InvalidInput(String),

    #[error("Invalid station lookup URL '{url}': {reason}")]
    InvalidLookupUrl { url: String, reason: String },

    #[error("Station '{name}' not found after {attempts} attempt(s): {reason}")]
    StationNotFound {
        name: String,
        attempts: u32,
        reason: String,
    },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus { url: String, status: StatusCode },
}

impl LocateStationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LocateStationError::InvalidInput(_) | LocateStationError::InvalidLookupUrl { .. } => {
                ErrorKind::InvalidInput
            }
            LocateStationError::StationNotFound { .. } => ErrorKind::StationNotFound,
            LocateStationError::Transport(_) | LocateStationError::HttpStatus { .. } => {
                ErrorKind::UpstreamError
            }
        }
    }
}
