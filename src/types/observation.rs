use crate::types::civil::CivilDateTime;

/// One temperature sample scraped from a day's observation table.
///
/// `temperature` is `None` when the scraped value was outside the plausible
/// `[-100, 100]` range. Such samples are kept but never aggregated.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub station_id: String,
    pub local_time: CivilDateTime,
    pub temperature: Option<f64>,
}
