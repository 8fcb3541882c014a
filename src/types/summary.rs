use crate::types::civil::CivilDateTime;
use crate::types::serial_date::SerialDate;

/// Temperature statistics over one backfilled interval.
///
/// Temperatures are rounded to two decimals. When no sample fell inside the
/// interval they are all `None`: a gap in the weather record is reported as
/// such, never zero-filled.
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalSummary {
    pub station_id: String,
    pub start_date: CivilDateTime,
    pub end_date: CivilDateTime,
    /// Serial bounds the summary was computed for.
    pub begin: SerialDate,
    pub end: SerialDate,
    pub min_temperature: Option<f64>,
    pub max_temperature: Option<f64>,
    pub average_temperature: Option<f64>,
    pub median_temperature: Option<f64>,
    /// Number of non-null samples aggregated.
    pub sample_count: usize,
}

impl IntervalSummary {
    pub fn is_gap(&self) -> bool {
        self.sample_count == 0
    }
}
