use crate::config::ScraperConfig;
use crate::stations::error::LocateStationError;
use crate::transport::{HttpTransport, TransportError};
use log::{info, warn};
use reqwest::{StatusCode, Url};
use std::fmt;
use std::fmt::{Display, Formatter};

const FIELD_DELIMITER: char = '|';

/// Resolves a human-readable station name ("Bressuire") into the numeric id
/// the observation pages are keyed by.
pub struct StationResolver<'a, T> {
    transport: &'a T,
    config: &'a ScraperConfig,
}

// Why one attempt failed. Every variant is retried.
#[derive(Debug)]
enum AttemptFailure {
    Transport(TransportError),
    Status(StatusCode),
    Malformed(&'static str),
}

impl Display for AttemptFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AttemptFailure::Transport(e) => match std::error::Error::source(e) {
                Some(source) => write!(f, "{}: {}", e, source),
                None => write!(f, "{}", e),
            },
            AttemptFailure::Status(status) => write!(f, "HTTP status {}", status),
            AttemptFailure::Malformed(reason) => f.write_str(reason),
        }
    }
}

impl<'a, T: HttpTransport> StationResolver<'a, T> {
    pub fn new(transport: &'a T, config: &'a ScraperConfig) -> Self {
        Self { transport, config }
    }

    /// Looks the station up, retrying transient failures (network errors,
    /// non-success statuses, malformed answers) with exponential backoff.
    ///
    /// At most `max_attempts` requests are sent. When the last attempt got
    /// an answer that holds no usable id the result is
    /// [`LocateStationError::StationNotFound`]; when it failed upstream the
    /// transport or status error is returned.
    pub async fn resolve(&self, station_name: &str) -> Result<String, LocateStationError> {
        let name = station_name.trim();
        if name.is_empty() {
            return Err(LocateStationError::InvalidInput(station_name.to_string()));
        }

        let url = self.lookup_url(name)?;
        let attempts = self.config.max_attempts.max(1);

        let mut attempt = 1;
        loop {
            let failure = match self.attempt(&url).await {
                Ok(id) => {
                    info!("Station '{}' resolved to id {}", name, id);
                    return Ok(id);
                }
                Err(failure) => failure,
            };

            warn!("Attempt {} failed for {}: {}", attempt, url, failure);
            if attempt >= attempts {
                return Err(match failure {
                    AttemptFailure::Transport(e) => LocateStationError::Transport(e),
                    AttemptFailure::Status(status) => LocateStationError::HttpStatus { url, status },
                    AttemptFailure::Malformed(reason) => LocateStationError::StationNotFound {
                        name: name.to_string(),
                        attempts,
                        reason: reason.to_string(),
                    },
                });
            }

            let delay = self.config.backoff_base * 2u32.saturating_pow(attempt);
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    async fn attempt(&self, url: &str) -> Result<String, AttemptFailure> {
        let response = self
            .transport
            .post(url)
            .await
            .map_err(AttemptFailure::Transport)?;
        if !response.status.is_success() {
            return Err(AttemptFailure::Status(response.status));
        }
        parse_station_id(&response.body).map_err(AttemptFailure::Malformed)
    }

    fn lookup_url(&self, name: &str) -> Result<String, LocateStationError> {
        let base = &self.config.station_lookup_url;
        let mut url = Url::parse(base).map_err(|e| LocateStationError::InvalidLookupUrl {
            url: base.clone(),
            reason: e.to_string(),
        })?;
        url.query_pairs_mut().append_pair("str", name);
        Ok(url.to_string())
    }
}

/// Extracts the id from a `id|name|...` lookup answer. The id must be a
/// canonical integer: no sign, no leading zeros, nothing but digits.
fn parse_station_id(body: &str) -> Result<String, &'static str> {
    if !body.contains(FIELD_DELIMITER) {
        return Err("invalid response format for the station");
    }
    let id = body.split(FIELD_DELIMITER).next().unwrap_or_default().trim();
    if id.is_empty() {
        return Err("station id not found in the response");
    }
    match id.parse::<u64>() {
        Ok(number) if number.to_string() == id => Ok(id.to_string()),
        _ => Err("station id is not a number in the response"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::transport::testing::{network_error, ScriptedTransport};
    use crate::transport::HttpResponse;
    use std::time::Duration;

    fn fast_config() -> ScraperConfig {
        ScraperConfig::builder().backoff_base(Duration::ZERO).build()
    }

    #[test]
    fn test_parse_station_id() {
        assert_eq!(parse_station_id("12345|Other data"), Ok("12345".to_string()));
        assert_eq!(parse_station_id(" 79049004 |Bressuire (79)|"), Ok("79049004".to_string()));
        assert!(parse_station_id("12345").is_err());
        assert!(parse_station_id("|").is_err());
        assert!(parse_station_id("bob|").is_err());
        assert!(parse_station_id("007|").is_err());
        assert!(parse_station_id("-5|").is_err());
    }

    #[tokio::test]
    async fn test_resolve_returns_id() -> Result<(), Box<dyn std::error::Error>> {
        let transport = ScriptedTransport::always("12345|Other data");
        let config = fast_config();

        let id = StationResolver::new(&transport, &config)
            .resolve("TestStation")
            .await?;

        assert_eq!(id, "12345");
        let urls = transport.urls("POST");
        assert_eq!(urls.len(), 1);
        assert!(urls[0].starts_with(&config.station_lookup_url));
        assert!(urls[0].ends_with("&str=TestStation"));
        Ok(())
    }

    #[tokio::test]
    async fn test_blank_name_is_rejected_without_request() {
        let transport = ScriptedTransport::always("12345|x");
        let config = fast_config();
        let resolver = StationResolver::new(&transport, &config);

        for name in ["", "   "] {
            let err = resolver.resolve(name).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidInput);
        }
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_delimiter_fails_after_three_attempts() {
        let transport = ScriptedTransport::always("no delimiter here");
        let config = fast_config();

        let err = StationResolver::new(&transport, &config)
            .resolve("InvalidStation")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::StationNotFound);
        assert!(matches!(
            err,
            LocateStationError::StationNotFound { attempts: 3, .. }
        ));
        assert_eq!(transport.calls().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_doubles_between_attempts() {
        let transport = ScriptedTransport::always("no delimiter here");
        let config = ScraperConfig::default();
        let started = tokio::time::Instant::now();

        let err = StationResolver::new(&transport, &config)
            .resolve("InvalidStation")
            .await
            .unwrap_err();

        // 2s after the first attempt, 4s after the second, none after the last.
        let elapsed = started.elapsed();
        assert_eq!(err.kind(), ErrorKind::StationNotFound);
        assert!(elapsed >= Duration::from_secs(6), "waited {elapsed:?}");
        assert!(elapsed < Duration::from_secs(7), "waited {elapsed:?}");
        assert_eq!(transport.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_non_numeric_id_is_not_found() {
        let transport = ScriptedTransport::always("bob|");
        let config = fast_config();

        let err = StationResolver::new(&transport, &config)
            .resolve("ValidStation")
            .await
            .unwrap_err();

        assert!(err.to_string().contains("not a number"));
        assert_eq!(err.kind(), ErrorKind::StationNotFound);
    }

    #[tokio::test]
    async fn test_permanent_network_error_is_bounded() {
        let transport = ScriptedTransport::new(|_, url| Err(network_error(url)));
        let config = fast_config();

        let err = StationResolver::new(&transport, &config)
            .resolve("NetworkIssueStation")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::UpstreamError);
        assert!(matches!(err, LocateStationError::Transport(_)));
        assert_eq!(transport.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_transient_failure_is_retried() -> Result<(), Box<dyn std::error::Error>> {
        let transport = ScriptedTransport::new(|_, url| {
            // Fails until the resolver has tried twice.
            static CALLS: std::sync::atomic::AtomicUsize = std::sync::atomic::AtomicUsize::new(0);
            match CALLS.fetch_add(1, std::sync::atomic::Ordering::SeqCst) {
                0 => Err(network_error(url)),
                1 => Ok(HttpResponse::new(StatusCode::SERVICE_UNAVAILABLE, "")),
                _ => Ok(HttpResponse::ok("79049004|Bressuire")),
            }
        });
        let config = fast_config();

        let id = StationResolver::new(&transport, &config)
            .resolve("Bressuire")
            .await?;

        assert_eq!(id, "79049004");
        assert_eq!(transport.calls().len(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_error_status_on_last_attempt() {
        let transport =
            ScriptedTransport::new(|_, _| Ok(HttpResponse::new(StatusCode::BAD_GATEWAY, "")));
        let config = ScraperConfig::builder()
            .backoff_base(Duration::ZERO)
            .max_attempts(2)
            .build();

        let err = StationResolver::new(&transport, &config)
            .resolve("Bressuire")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            LocateStationError::HttpStatus {
                status: StatusCode::BAD_GATEWAY,
                ..
            }
        ));
        assert_eq!(transport.calls().len(), 2);
    }
}
