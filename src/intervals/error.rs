use crate::error::ErrorKind;
use crate::types::serial_date::SerialDate;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SegmentError {
    #[error("Invalid or missing date in entry at index {index}")]
    MissingDate { index: usize },

    #[error("The date value {current} at index {index} is earlier than the previous date {previous}")]
    OutOfOrderDate {
        index: usize,
        previous: SerialDate,
        current: SerialDate,
    },
}

impl SegmentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SegmentError::MissingDate { .. } => ErrorKind::MissingDate,
            SegmentError::OutOfOrderDate { .. } => ErrorKind::OutOfOrderDate,
        }
    }
}
