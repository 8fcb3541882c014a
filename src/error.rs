use crate::clock::error::SerialClockError;
use crate::intervals::error::SegmentError;
use crate::sheet::error::SheetError;
use crate::stations::error::LocateStationError;
use crate::weather_data::error::WeatherDataError;
use thiserror::Error;

/// Closed set of failure categories callers can branch on.
///
/// Every error produced by this crate maps onto exactly one kind through
/// [`BackfillError::kind`], independently of its message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidDate,
    InvalidFormat,
    InvalidHour,
    MissingHour,
    OutOfOrderDate,
    MissingDate,
    InvalidInput,
    StationNotFound,
    UpstreamError,
    InconsistentDateRange,
    Spreadsheet,
    Output,
}

#[derive(Debug, Error)]
pub enum BackfillError {
    #[error(transparent)]
    Clock(#[from] SerialClockError),

    #[error(transparent)]
    Segment(#[from] SegmentError),

    #[error(transparent)]
    LocateStation(#[from] LocateStationError),

    #[error(transparent)]
    WeatherData(#[from] WeatherDataError),

    #[error(transparent)]
    Sheet(#[from] SheetError),

    #[error("Failed to build the HTTP client")]
    HttpClient(#[source] reqwest::Error),

    #[error("There is a problem with date ranges: previous end {previous_end}, interval {begin} -> {end}")]
    InconsistentDateRange {
        previous_end: String,
        begin: String,
        end: String,
    },

    #[error("Interval #{index} ({begin} -> {end}) failed")]
    Interval {
        index: usize,
        begin: String,
        end: String,
        #[source]
        source: Box<BackfillError>,
    },
}

impl BackfillError {
    /// The category of this error, looking through interval context wrappers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            BackfillError::Clock(e) => e.kind(),
            BackfillError::Segment(e) => e.kind(),
            BackfillError::LocateStation(e) => e.kind(),
            BackfillError::WeatherData(e) => e.kind(),
            BackfillError::Sheet(e) => e.kind(),
            BackfillError::HttpClient(_) => ErrorKind::UpstreamError,
            BackfillError::InconsistentDateRange { .. } => ErrorKind::InconsistentDateRange,
            BackfillError::Interval { source, .. } => source.kind(),
        }
    }
}
