//! This module provides the main entry point of the crate: the backfill
//! pipeline that turns spreadsheet meter readings into temperature summaries.

use crate::clock::serial_clock::SerialClock;
use crate::config::ScraperConfig;
use crate::error::BackfillError;
use crate::intervals::segmenter::segment;
use crate::stations::resolve_station::StationResolver;
use crate::transport::{HttpTransport, ReqwestTransport};
use crate::types::interval::{Interval, MeterReading};
use crate::types::serial_date::SerialDate;
use crate::types::summary::IntervalSummary;
use crate::weather_data::aggregator::RangeAggregator;
use log::{info, warn};

/// The backfill pipeline.
///
/// Holds the HTTP transport, the scraper configuration and the serial date
/// clock. Intervals are processed one after the other, and each interval
/// fetches its days one after the other, so the observation site never sees
/// more than one request in flight.
///
/// # Examples
///
/// ```rust,no_run
/// # use meteo_backfill::{Backfill, BackfillError, MeterReading, ScraperConfig, SerialClock};
/// #
/// # #[tokio::main]
/// # async fn main() -> Result<(), BackfillError> {
/// let backfill = Backfill::new(ScraperConfig::default(), SerialClock::default())?;
///
/// let readings = [
///     MeterReading::with_range(45638.32013888889, 1.5, 9.0),
///     MeterReading::bare(45639.31736111111),
/// ];
/// let summaries = backfill.run("Bressuire", &readings).await?;
/// for summary in &summaries {
///     println!("{:?} -> {:?}", summary.begin, summary.average_temperature);
/// }
/// # Ok(())
/// # }
/// ```
pub struct Backfill<T = ReqwestTransport> {
    transport: T,
    config: ScraperConfig,
    clock: SerialClock,
}

impl Backfill<ReqwestTransport> {
    /// Creates a pipeline talking to the network through `reqwest`.
    ///
    /// # Errors
    ///
    /// Returns [`BackfillError::HttpClient`] if the HTTP client cannot be built.
    pub fn new(config: ScraperConfig, clock: SerialClock) -> Result<Self, BackfillError> {
        let transport = ReqwestTransport::new(&config).map_err(BackfillError::HttpClient)?;
        Ok(Self::with_transport(transport, config, clock))
    }
}

impl<T: HttpTransport> Backfill<T> {
    pub fn with_transport(transport: T, config: ScraperConfig, clock: SerialClock) -> Self {
        Self {
            transport,
            config,
            clock,
        }
    }

    pub fn clock(&self) -> &SerialClock {
        &self.clock
    }

    /// Resolves a station name into the id used by the observation pages.
    pub async fn resolve_station(&self, station_name: &str) -> Result<String, BackfillError> {
        let resolver = StationResolver::new(&self.transport, &self.config);
        Ok(resolver.resolve(station_name).await?)
    }

    /// Runs the whole pipeline over sheet-ordered readings.
    ///
    /// # Arguments
    ///
    /// * `station_name` - Name of the weather station, e.g. `"Bressuire"`.
    /// * `readings` - Spreadsheet rows, in non-decreasing date order.
    ///
    /// # Returns
    ///
    /// One [`IntervalSummary`] per interval found by [`segment`], in order.
    /// The station is only looked up when there is at least one interval.
    ///
    /// # Errors
    ///
    /// Segmentation errors are returned as is. Failures while summarizing an
    /// interval are wrapped in [`BackfillError::Interval`], which names the
    /// failing range; [`BackfillError::kind`] looks through that wrapper.
    pub async fn run(
        &self,
        station_name: &str,
        readings: &[MeterReading],
    ) -> Result<Vec<IntervalSummary>, BackfillError> {
        let intervals = segment(readings)?;
        info!(
            "{} readings, {} intervals to backfill",
            readings.len(),
            intervals.len()
        );
        if intervals.is_empty() {
            return Ok(Vec::new());
        }

        let station_id = self.resolve_station(station_name).await?;
        self.summarize_intervals(&station_id, &intervals).await
    }

    /// Summarizes each interval in order.
    ///
    /// A zero-width interval is not fetched: it reuses the summary of the
    /// interval right before it, which must end where it begins. Otherwise
    /// the ranges are inconsistent and the run fails.
    pub async fn summarize_intervals(
        &self,
        station_id: &str,
        intervals: &[Interval],
    ) -> Result<Vec<IntervalSummary>, BackfillError> {
        let aggregator = RangeAggregator::new(&self.transport, &self.config, &self.clock)?;
        let mut summaries: Vec<IntervalSummary> = Vec::with_capacity(intervals.len());

        for (index, interval) in intervals.iter().enumerate() {
            info!(
                "Interval {}/{}: {} -> {}",
                index + 1,
                intervals.len(),
                self.describe(interval.begin),
                self.describe(interval.end)
            );

            let summary = if interval.is_zero_width() {
                self.reuse_previous(summaries.last(), interval)
            } else {
                aggregator
                    .summarize(station_id, interval.begin, interval.end)
                    .await
                    .map_err(BackfillError::from)
            };

            match summary {
                Ok(summary) => summaries.push(summary),
                Err(source) => {
                    return Err(BackfillError::Interval {
                        index,
                        begin: self.describe(interval.begin),
                        end: self.describe(interval.end),
                        source: Box::new(source),
                    })
                }
            }
        }

        Ok(summaries)
    }

    fn reuse_previous(
        &self,
        previous: Option<&IntervalSummary>,
        interval: &Interval,
    ) -> Result<IntervalSummary, BackfillError> {
        match previous {
            Some(previous) if previous.end == interval.begin => {
                info!(
                    "Zero-width interval at {}, reusing the previous summary",
                    self.describe(interval.begin)
                );
                Ok(IntervalSummary {
                    start_date: previous.end_date,
                    begin: interval.begin,
                    end: interval.end,
                    ..previous.clone()
                })
            }
            _ => {
                let previous_end = previous
                    .map(|p| self.describe(p.end))
                    .unwrap_or_else(|| "none".to_string());
                warn!(
                    "Zero-width interval at {} does not follow the previous one (ended {})",
                    self.describe(interval.begin),
                    previous_end
                );
                Err(BackfillError::InconsistentDateRange {
                    previous_end,
                    begin: self.describe(interval.begin),
                    end: self.describe(interval.end),
                })
            }
        }
    }

    // Falls back to the raw number for serials the clock cannot render.
    fn describe(&self, serial: SerialDate) -> String {
        self.clock
            .serial_to_string(serial)
            .unwrap_or_else(|_| serial.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::transport::testing::{network_error, ScriptedTransport};
    use crate::transport::HttpResponse;
    use crate::weather_data::fetcher::tests::page;
    use std::time::Duration;

    fn backfill(transport: ScriptedTransport) -> Backfill<ScriptedTransport> {
        let config = ScraperConfig::builder().backoff_base(Duration::ZERO).build();
        Backfill::with_transport(transport, config, SerialClock::default())
    }

    /// Station lookups answer id 7630; every day page serves the same rows.
    fn site() -> ScriptedTransport {
        let body = page(&[
            ("23h00", "4.0 &deg;C"),
            ("12h00", "8.0 &deg;C"),
            ("06h00", "2.0 &deg;C"),
        ]);
        ScriptedTransport::new(move |method, _| match method {
            "POST" => Ok(HttpResponse::ok("7630|Bressuire (79)|")),
            _ => Ok(HttpResponse::ok(body.clone())),
        })
    }

    #[tokio::test]
    async fn test_run() -> Result<(), Box<dyn std::error::Error>> {
        let backfill = backfill(site());
        let readings = [
            MeterReading::with_range(45638.0, 1.0, 9.0),
            // 12/12/2024 10:00 -> 13/12/2024 10:00
            MeterReading::bare(45639.416666666664),
            MeterReading::bare(45640.416666666664),
            MeterReading::with_range(45641.0, 1.0, 2.0),
        ];

        let summaries = backfill.run("Bressuire", &readings).await?;

        assert_eq!(summaries.len(), 2);
        let first = &summaries[0];
        assert_eq!(first.station_id, "7630");
        assert_eq!(first.begin, SerialDate(45638.0));
        // Every 12/12 sample, plus 13/12 06:00.
        assert_eq!(first.sample_count, 4);
        assert_eq!(first.min_temperature, Some(2.0));
        assert_eq!(first.max_temperature, Some(8.0));
        Ok(())
    }

    #[tokio::test]
    async fn test_station_is_resolved_once() -> Result<(), Box<dyn std::error::Error>> {
        let transport = site();
        let backfill = backfill(transport);
        let readings = [
            MeterReading::bare(45638.0),
            MeterReading::bare(45638.5),
            MeterReading::bare(45639.0),
        ];

        backfill.run("Bressuire", &readings).await?;

        assert_eq!(backfill.transport.urls("POST").len(), 1);
        // 12/12 for the first interval, 12/12 and 13/12 for the second.
        assert_eq!(backfill.transport.urls("GET").len(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_no_interval_skips_station_lookup() -> Result<(), Box<dyn std::error::Error>> {
        let backfill = backfill(site());
        let readings = [
            MeterReading::with_range(45638.0, 1.0, 9.0),
            MeterReading::with_range(45639.0, 2.0, 8.0),
        ];

        let summaries = backfill.run("Bressuire", &readings).await?;

        assert!(summaries.is_empty());
        assert!(backfill.transport.calls().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_zero_width_reuses_previous_summary() -> Result<(), Box<dyn std::error::Error>> {
        let backfill = backfill(site());
        let intervals = [
            Interval::new(SerialDate(45638.25), SerialDate(45638.75)),
            Interval::new(SerialDate(45638.75), SerialDate(45638.75)),
        ];

        let summaries = backfill.summarize_intervals("7630", &intervals).await?;

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[1].begin, SerialDate(45638.75));
        assert_eq!(summaries[1].end, SerialDate(45638.75));
        assert_eq!(
            summaries[1].average_temperature,
            summaries[0].average_temperature
        );
        assert_eq!(summaries[0].average_temperature, Some(5.0));
        // The zero-width interval triggers no fetch.
        assert_eq!(backfill.transport.urls("GET").len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_zero_width_without_matching_previous_fails() {
        let backfill = backfill(site());

        let err = backfill
            .summarize_intervals(
                "7630",
                &[Interval::new(SerialDate(45638.75), SerialDate(45638.75))],
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InconsistentDateRange);

        let err = backfill
            .summarize_intervals(
                "7630",
                &[
                    Interval::new(SerialDate(45638.25), SerialDate(45638.5)),
                    Interval::new(SerialDate(45638.75), SerialDate(45638.75)),
                ],
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InconsistentDateRange);
        assert!(matches!(err, BackfillError::Interval { index: 1, .. }));
    }

    #[tokio::test]
    async fn test_interval_failure_names_the_range() {
        let backfill = backfill(ScriptedTransport::new(|_, url| Err(network_error(url))));

        let err = backfill
            .summarize_intervals(
                "7630",
                &[Interval::new(SerialDate(45638.25), SerialDate(45638.75))],
            )
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::UpstreamError);
        assert!(err.to_string().contains("12/12/2024 06:00:00"));
    }

    #[tokio::test]
    async fn test_out_of_order_rows() {
        let backfill = backfill(site());
        let readings = [MeterReading::bare(45639.0), MeterReading::bare(45638.0)];

        let err = backfill.run("Bressuire", &readings).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::OutOfOrderDate);
        assert!(backfill.transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_station() {
        let backfill = backfill(ScriptedTransport::always("nothing here"));
        let readings = [MeterReading::bare(45638.0), MeterReading::bare(45639.0)];

        let err = backfill.run("Nowhere", &readings).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::StationNotFound);
    }
}
