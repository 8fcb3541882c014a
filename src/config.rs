use bon::bon;
use std::time::Duration;

pub const DEFAULT_OBSERVATION_URL: &str = "https://www.meteociel.fr/temps-reel/obs_villes.php";
pub const DEFAULT_STATION_LOOKUP_URL: &str =
    "https://www.meteociel.fr/temps-reel/lieuhelper.php?mode=findstation";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
/// The observation table is the third child of its parent and spans the page.
pub const DEFAULT_TABLE_SELECTOR: &str = r#"table:nth-child(3)[width="100%"]"#;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BACKOFF_BASE: Duration = Duration::from_secs(1);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Where and how the observation site is scraped.
#[derive(Debug, Clone, PartialEq)]
pub struct ScraperConfig {
    /// Day-scoped observation page, queried with station id and date.
    pub observation_url: String,
    /// Station lookup endpoint; the station name is appended as `str`.
    pub station_lookup_url: String,
    pub user_agent: String,
    /// CSS selector of the observation table.
    pub table_selector: String,
    /// Station lookup attempts before giving up.
    pub max_attempts: u32,
    /// Backoff before retry `n` is `backoff_base * 2^n`.
    pub backoff_base: Duration,
    /// Applies to each HTTP request individually.
    pub request_timeout: Duration,
}

#[bon]
impl ScraperConfig {
    /// Builds a configuration. Unset fields take the `DEFAULT_*` values.
    ///
    /// # Examples
    ///
    /// ```
    /// use meteo_backfill::ScraperConfig;
    /// use std::time::Duration;
    ///
    /// let config = ScraperConfig::builder()
    ///     .max_attempts(5)
    ///     .backoff_base(Duration::from_millis(500))
    ///     .build();
    /// assert_eq!(config.max_attempts, 5);
    /// assert_eq!(config.request_timeout, Duration::from_secs(30));
    /// ```
    #[builder]
    pub fn new(
        #[builder(into)] observation_url: Option<String>,
        #[builder(into)] station_lookup_url: Option<String>,
        #[builder(into)] user_agent: Option<String>,
        #[builder(into)] table_selector: Option<String>,
        max_attempts: Option<u32>,
        backoff_base: Option<Duration>,
        request_timeout: Option<Duration>,
    ) -> Self {
        Self {
            observation_url: observation_url
                .unwrap_or_else(|| DEFAULT_OBSERVATION_URL.to_string()),
            station_lookup_url: station_lookup_url
                .unwrap_or_else(|| DEFAULT_STATION_LOOKUP_URL.to_string()),
            user_agent: user_agent.unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            table_selector: table_selector.unwrap_or_else(|| DEFAULT_TABLE_SELECTOR.to_string()),
            max_attempts: max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS).max(1),
            backoff_base: backoff_base.unwrap_or(DEFAULT_BACKOFF_BASE),
            request_timeout: request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT),
        }
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}
