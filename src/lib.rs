mod backfill;
mod clock;
mod config;
mod error;
mod intervals;
mod sheet;
mod stations;
mod transport;
mod types;
mod weather_data;

pub use backfill::Backfill;
pub use config::*;
pub use error::{BackfillError, ErrorKind};

pub use clock::error::SerialClockError;
pub use clock::serial_clock::{
    format_hour, SerialClock, DATETIME_FORMAT, DATE_FORMAT, DEFAULT_TIMEZONE, HOUR_FORMAT,
};

pub use intervals::error::SegmentError;
pub use intervals::segmenter::segment;

pub use sheet::error::SheetError;
pub use sheet::reader::{read_meter_readings, readings_from_range, DEFAULT_HEADER_ROW, DEFAULT_SHEET};
pub use sheet::writer::{write_summaries, write_to, OutputFormat};

pub use stations::error::LocateStationError;
pub use stations::resolve_station::StationResolver;

pub use transport::{HttpResponse, HttpTransport, ReqwestTransport, TransportError};

pub use types::civil::CivilDateTime;
pub use types::interval::{Interval, MeterReading};
pub use types::observation::Observation;
pub use types::serial_date::SerialDate;
pub use types::summary::IntervalSummary;

pub use weather_data::aggregator::RangeAggregator;
pub use weather_data::error::WeatherDataError;
pub use weather_data::fetcher::ObservationFetcher;
pub use weather_data::stats::{max, mean, median, min, round2};
