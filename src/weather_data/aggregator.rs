use crate::clock::error::SerialClockError;
use crate::clock::serial_clock::SerialClock;
use crate::config::ScraperConfig;
use crate::transport::HttpTransport;
use crate::types::civil::CivilDateTime;
use crate::types::serial_date::SerialDate;
use crate::types::summary::IntervalSummary;
use crate::weather_data::error::WeatherDataError;
use crate::weather_data::fetcher::ObservationFetcher;
use crate::weather_data::stats::{max, mean, median, min, round2};
use log::{info, warn};

/// Summarizes the temperatures observed between two serial dates.
pub struct RangeAggregator<'a, T> {
    fetcher: ObservationFetcher<'a, T>,
    clock: &'a SerialClock,
}

impl<'a, T: HttpTransport> RangeAggregator<'a, T> {
    pub fn new(
        transport: &'a T,
        config: &'a ScraperConfig,
        clock: &'a SerialClock,
    ) -> Result<Self, WeatherDataError> {
        Ok(Self {
            fetcher: ObservationFetcher::new(transport, config, clock)?,
            clock,
        })
    }

    /// Fetches every day the range touches, one after the other, and
    /// computes the statistics of the samples falling inside `[begin, end]`.
    ///
    /// A range without any sample is not an error: its statistics are `None`.
    pub async fn summarize(
        &self,
        station_id: &str,
        begin: SerialDate,
        end: SerialDate,
    ) -> Result<IntervalSummary, WeatherDataError> {
        let start_date = self.clock.to_civil(begin)?;
        let end_date = self.clock.to_civil(end)?;
        if end_date < start_date {
            return Err(WeatherDataError::ReversedRange {
                start: self.clock.format(&start_date),
                end: self.clock.format(&end_date),
            });
        }
        info!(
            "Summarizing {} -> {}",
            self.clock.format(&start_date),
            self.clock.format(&end_date)
        );

        let boundary = iteration_boundary(&start_date, &end_date)
            .ok_or(SerialClockError::OutOfRange(end.get()))?;

        let mut temperatures = Vec::new();
        let mut cursor = start_date;
        while cursor < boundary {
            info!(
                "Fetching {} from {}",
                self.clock.format_date(&cursor),
                self.clock.format_hour_of_day(&cursor)
            );
            let observations = self.fetcher.fetch_day(station_id, &cursor).await?;
            if observations.is_empty() {
                warn!(
                    "No observation for station {} on {}",
                    station_id,
                    self.clock.format_date(&cursor)
                );
            }
            temperatures.extend(
                observations
                    .iter()
                    .filter(|o| start_date <= o.local_time && o.local_time <= end_date)
                    .filter_map(|o| o.temperature),
            );
            cursor = cursor
                .add_days(1)
                .ok_or(SerialClockError::OutOfRange(end.get()))?;
        }

        if temperatures.is_empty() {
            warn!(
                "Data gap: no temperature for station {} between {} and {}",
                station_id,
                self.clock.format(&start_date),
                self.clock.format(&end_date)
            );
        }

        Ok(IntervalSummary {
            station_id: station_id.to_string(),
            start_date,
            end_date,
            begin,
            end,
            min_temperature: min(&temperatures).map(round2),
            max_temperature: max(&temperatures).map(round2),
            average_temperature: mean(&temperatures).map(round2),
            median_temperature: median(&temperatures).map(round2),
            sample_count: temperatures.len(),
        })
    }
}

/// First instant the day loop must not reach. Stepping whole days from the
/// start time would miss the last day when the end falls earlier in its day
/// than the start, so the boundary is pushed one day further in that case.
fn iteration_boundary(start: &CivilDateTime, end: &CivilDateTime) -> Option<CivilDateTime> {
    if start.is_same_day(end) || end.time() > start.time() {
        Some(*end)
    } else {
        end.add_days(1)
    }
}
