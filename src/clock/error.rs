use crate::error::ErrorKind;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SerialClockError {
    #[error("Invalid serial date {0}: dates before 01/01/1900 (serial 1) are not addressable")]
    InvalidDate(f64),

    #[error("Serial date {0} is outside the representable calendar range")]
    OutOfRange(f64),

    #[error("Invalid date '{input}', expected format '{format}'")]
    InvalidFormat { input: String, format: String },

    #[error("Hour is not defined")]
    MissingHour,

    #[error("Invalid hour '{token}': {reason}")]
    InvalidHour { token: String, reason: &'static str },
}

impl SerialClockError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SerialClockError::InvalidDate(_) | SerialClockError::OutOfRange(_) => {
                ErrorKind::InvalidDate
            }
            SerialClockError::InvalidFormat { .. } => ErrorKind::InvalidFormat,
            SerialClockError::MissingHour => ErrorKind::MissingHour,
            SerialClockError::InvalidHour { .. } => ErrorKind::InvalidHour,
        }
    }
}
