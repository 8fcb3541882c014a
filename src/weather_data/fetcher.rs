use crate::clock::serial_clock::{format_hour, SerialClock};
use crate::config::ScraperConfig;
use crate::transport::HttpTransport;
use crate::types::civil::CivilDateTime;
use crate::types::observation::Observation;
use crate::weather_data::error::WeatherDataError;
use crate::weather_data::extractor::{extract_rows, parse_float_prefix, RawRow, TableSelectors};
use log::{error, info, warn};
use reqwest::Url;

const MIN_PLAUSIBLE_TEMPERATURE: f64 = -100.0;
const MAX_PLAUSIBLE_TEMPERATURE: f64 = 100.0;

/// Scrapes one day of observations for a station.
pub struct ObservationFetcher<'a, T> {
    transport: &'a T,
    config: &'a ScraperConfig,
    clock: &'a SerialClock,
    selectors: TableSelectors,
}

impl<'a, T: HttpTransport> ObservationFetcher<'a, T> {
    pub fn new(
        transport: &'a T,
        config: &'a ScraperConfig,
        clock: &'a SerialClock,
    ) -> Result<Self, WeatherDataError> {
        Ok(Self {
            transport,
            config,
            clock,
            selectors: TableSelectors::new(&config.table_selector)?,
        })
    }

    /// Fetches the observations published for the calendar day of `day`.
    ///
    /// Rows that cannot be read are dropped with a warning. An empty table
    /// yields an empty list; a page without the table is an upstream error.
    pub async fn fetch_day(
        &self,
        station_id: &str,
        day: &CivilDateTime,
    ) -> Result<Vec<Observation>, WeatherDataError> {
        let station_id = station_id.trim();
        if station_id.is_empty() {
            return Err(WeatherDataError::InvalidStationId(station_id.to_string()));
        }

        let url = self.day_url(station_id, day)?;
        info!("Calling {}", url);

        let response = self.transport.get(&url).await?;
        if !response.status.is_success() {
            return Err(WeatherDataError::HttpStatus {
                url,
                status: response.status,
            });
        }

        let rows = extract_rows(&response.body, &self.selectors).ok_or_else(|| {
            WeatherDataError::TableNotFound {
                url: url.clone(),
                selector: self.selectors.table_selector().to_string(),
            }
        })?;

        Ok(rows
            .into_iter()
            .filter_map(|row| self.observation(station_id, day, row))
            .collect())
    }

    fn day_url(&self, station_id: &str, day: &CivilDateTime) -> Result<String, WeatherDataError> {
        let base = &self.config.observation_url;
        let mut url = Url::parse(base).map_err(|e| WeatherDataError::InvalidUrl {
            url: base.clone(),
            reason: e.to_string(),
        })?;
        // The site numbers months from 0.
        url.query_pairs_mut()
            .append_pair("code2", station_id)
            .append_pair("jour2", &day.day().to_string())
            .append_pair("mois2", &(day.month() - 1).to_string())
            .append_pair("annee2", &day.year().to_string())
            .append_pair("affint", "1");
        Ok(url.to_string())
    }

    fn observation(&self, station_id: &str, day: &CivilDateTime, row: RawRow) -> Option<Observation> {
        let hour = match format_hour(row.hour.as_deref()) {
            Ok(hour) => hour,
            Err(e) => {
                warn!("Skipping row of {}: {}", day.format("%d/%m/%Y"), e);
                return None;
            }
        };

        let Some(temperature) = row.temperature.as_deref().and_then(parse_float_prefix) else {
            warn!(
                "Skipping row {} of {}: temperature '{}' is not a number",
                hour,
                day.format("%d/%m/%Y"),
                row.temperature.unwrap_or_default()
            );
            return None;
        };

        let local_time = match self.clock.civil_at(day, &hour) {
            Ok(time) => time,
            Err(e) => {
                warn!("Skipping row of {}: {}", day.format("%d/%m/%Y"), e);
                return None;
            }
        };

        Some(Observation {
            station_id: station_id.to_string(),
            local_time,
            temperature: sanitize_temperature(temperature, &local_time),
        })
    }
}

/// Keeps temperatures inside the plausible `[-100, 100]` °C range.
fn sanitize_temperature(value: f64, at: &CivilDateTime) -> Option<f64> {
    if (MIN_PLAUSIBLE_TEMPERATURE..=MAX_PLAUSIBLE_TEMPERATURE).contains(&value) {
        Some(value)
    } else {
        error!("Discarding implausible temperature {} at {}", value, at);
        None
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::transport::testing::{network_error, ScriptedTransport};
    use crate::transport::HttpResponse;
    use crate::types::serial_date::SerialDate;
    use reqwest::StatusCode;

    /// One day of observations in the layout the site serves.
    pub(crate) const DAY_PAGE: &str = r#"<html><body>
        <div>
          <p>Bressuire (79)</p>
          <p>Samedi 14 decembre 2024</p>
          <table width="100%" border="1">
            <tr><td>Heure locale</td><td>Neb.</td><td>Temperature</td><td>Humidite</td></tr>
            <tr><td>23h54</td><td>8/8</td><td>4.9 &deg;C</td><td>95%</td></tr>
            <tr><td>23h48</td><td>8/8</td><td>4.8 &deg;C</td><td>95%</td></tr>
          </table>
        </div>
    </body></html>"#;

    pub(crate) fn page(rows: &[(&str, &str)]) -> String {
        let rows: String = rows
            .iter()
            .map(|(hour, temp)| format!("<tr><td>{hour}</td><td>8/8</td><td>{temp}</td></tr>"))
            .collect();
        format!(
            r#"<html><body><div><p>a</p><p>b</p><table width="100%"><tr><td>Heure locale</td></tr>{rows}</table></div></body></html>"#
        )
    }

    fn day(clock: &SerialClock) -> CivilDateTime {
        // 14/12/2024 00:30:00
        clock.to_civil(SerialDate(45640.020833333336)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_day() -> Result<(), Box<dyn std::error::Error>> {
        let transport = ScriptedTransport::always(DAY_PAGE);
        let config = ScraperConfig::default();
        let clock = SerialClock::default();
        let fetcher = ObservationFetcher::new(&transport, &config, &clock)?;

        let observations = fetcher.fetch_day("7630", &day(&clock)).await?;

        let rendered: Vec<(String, Option<f64>)> = observations
            .iter()
            .map(|o| (clock.format(&o.local_time), o.temperature))
            .collect();
        assert_eq!(
            rendered,
            vec![
                ("14/12/2024 23:54:00".to_string(), Some(4.9)),
                ("14/12/2024 23:48:00".to_string(), Some(4.8)),
            ]
        );
        assert!(observations.iter().all(|o| o.station_id == "7630"));
        assert_eq!(
            transport.urls("GET"),
            vec![format!(
                "{}?code2=7630&jour2=14&mois2=11&annee2=2024&affint=1",
                config.observation_url
            )]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_bad_rows_are_dropped() -> Result<(), Box<dyn std::error::Error>> {
        let body = page(&[
            ("10h00", "3.5 &deg;C"),
            ("junk", "2.0"),
            ("25h00", "2.0"),
            ("11h00", "n/a"),
            ("24h00", "1.0"),
            ("12h00", "150.0"),
        ]);
        let transport = ScriptedTransport::new(move |_, _| Ok(HttpResponse::ok(body.clone())));
        let config = ScraperConfig::default();
        let clock = SerialClock::default();
        let fetcher = ObservationFetcher::new(&transport, &config, &clock)?;

        let observations = fetcher.fetch_day("7630", &day(&clock)).await?;

        let rendered: Vec<(String, Option<f64>)> = observations
            .iter()
            .map(|o| (clock.format(&o.local_time), o.temperature))
            .collect();
        assert_eq!(
            rendered,
            vec![
                ("14/12/2024 10:00:00".to_string(), Some(3.5)),
                ("15/12/2024 00:00:00".to_string(), Some(1.0)),
                ("14/12/2024 12:00:00".to_string(), None),
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_table_is_valid() -> Result<(), Box<dyn std::error::Error>> {
        let body = page(&[]);
        let transport = ScriptedTransport::new(move |_, _| Ok(HttpResponse::ok(body.clone())));
        let config = ScraperConfig::default();
        let clock = SerialClock::default();
        let fetcher = ObservationFetcher::new(&transport, &config, &clock)?;

        assert!(fetcher.fetch_day("7630", &day(&clock)).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_table_is_upstream_error() {
        let transport = ScriptedTransport::always("<html><body><p>Maintenance</p></body></html>");
        let config = ScraperConfig::default();
        let clock = SerialClock::default();
        let fetcher = ObservationFetcher::new(&transport, &config, &clock).unwrap();

        let err = fetcher.fetch_day("7630", &day(&clock)).await.unwrap_err();

        assert!(matches!(err, WeatherDataError::TableNotFound { .. }));
        assert_eq!(err.kind(), ErrorKind::UpstreamError);
    }

    #[tokio::test]
    async fn test_upstream_failures() {
        let config = ScraperConfig::default();
        let clock = SerialClock::default();

        let failing = ScriptedTransport::new(|_, url| Err(network_error(url)));
        let fetcher = ObservationFetcher::new(&failing, &config, &clock).unwrap();
        let err = fetcher.fetch_day("7630", &day(&clock)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UpstreamError);

        let erroring =
            ScriptedTransport::new(|_, _| Ok(HttpResponse::new(StatusCode::NOT_FOUND, DAY_PAGE)));
        let fetcher = ObservationFetcher::new(&erroring, &config, &clock).unwrap();
        let err = fetcher.fetch_day("7630", &day(&clock)).await.unwrap_err();
        assert!(matches!(
            err,
            WeatherDataError::HttpStatus {
                status: StatusCode::NOT_FOUND,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_blank_station_id() {
        let transport = ScriptedTransport::always(DAY_PAGE);
        let config = ScraperConfig::default();
        let clock = SerialClock::default();
        let fetcher = ObservationFetcher::new(&transport, &config, &clock).unwrap();

        let err = fetcher.fetch_day(" ", &day(&clock)).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(transport.calls().is_empty());
    }
}
