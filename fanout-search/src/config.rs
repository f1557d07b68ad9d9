//! Search configuration with sensible defaults.
//!
//! [`SearchConfig`] controls the overall deadline, per-source retries,
//! caching, HTTP behaviour and every external endpoint the adapters talk to.
//! Endpoints are overridable so that tests can point adapters at a mock
//! server.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// Configuration for a search service.
///
/// Use [`Default::default()`] for sensible defaults, or construct with
/// field overrides for custom behaviour. Deserializes with every field
/// optional, so a partial TOML section is enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Initial state of the search-enabled flag.
    pub enabled: bool,
    /// Default overall deadline for one search, in milliseconds.
    pub timeout_ms: u64,
    /// Retries per source after the first failed attempt.
    pub max_retries: u32,
    /// Backoff unit: retry `n` waits `n * retry_base_delay_ms`.
    pub retry_base_delay_ms: u64,
    /// How long a cached response stays valid. Set to 0 to disable caching.
    pub cache_ttl_seconds: u64,
    /// Per-request HTTP timeout in seconds.
    pub request_timeout_seconds: u64,
    /// Custom User-Agent string. If `None`, rotates through a built-in list
    /// of realistic browser User-Agents.
    pub user_agent: Option<String>,
    /// Location used by the weather adapter when the query names none.
    pub default_location: String,
    /// Key for the authenticated news API. Without it the news adapter
    /// returns a fixed list of outlet pointers.
    pub news_api_key: Option<String>,
    /// Reverse-proxy prefixes for sources that reject direct requests.
    /// The percent-encoded target URL is appended to the prefix.
    pub proxies: Vec<String>,
    /// External endpoints.
    pub endpoints: EndpointConfig,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_ms: 15_000,
            max_retries: 3,
            retry_base_delay_ms: 1_000,
            cache_ttl_seconds: 300,
            request_timeout_seconds: 15,
            user_agent: None,
            default_location: "London".to_owned(),
            news_api_key: None,
            proxies: vec![
                "https://api.allorigins.win/raw?url=".to_owned(),
                "https://corsproxy.io/?".to_owned(),
                "https://proxy.cors.sh/".to_owned(),
            ],
            endpoints: EndpointConfig::default(),
        }
    }
}

/// Base URLs for every external collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Place-name geocoding (returns a JSON array of candidates).
    pub geocode: String,
    /// Coordinate-based forecast service.
    pub forecast: String,
    /// Authenticated news search.
    pub news: String,
    /// Instant-answer API.
    pub instant_answer: String,
    /// Encyclopedic full-text search API.
    pub encyclopedia_search: String,
    /// Encyclopedic summary endpoint; the article title is appended.
    pub encyclopedia_summary: String,
    /// Public article URL prefix; the article title is appended.
    pub encyclopedia_article: String,
    /// Self-hosted meta-search instances, queried as separate sources.
    pub meta_search: Vec<String>,
    /// Academic Atom feed query endpoint.
    pub academic: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            geocode: "https://nominatim.openstreetmap.org/search".to_owned(),
            forecast: "https://api.open-meteo.com/v1/forecast".to_owned(),
            news: "https://newsapi.org/v2/everything".to_owned(),
            instant_answer: "https://api.duckduckgo.com/".to_owned(),
            encyclopedia_search: "https://en.wikipedia.org/w/api.php".to_owned(),
            encyclopedia_summary: "https://en.wikipedia.org/api/rest_v1/page/summary/".to_owned(),
            encyclopedia_article: "https://en.wikipedia.org/wiki/".to_owned(),
            meta_search: vec![
                "https://searx.tiekoetter.com".to_owned(),
                "https://search.bus-hit.me".to_owned(),
            ],
            academic: "https://export.arxiv.org/api/query".to_owned(),
        }
    }
}

impl EndpointConfig {
    fn all(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("geocode", self.geocode.as_str()),
            ("forecast", self.forecast.as_str()),
            ("news", self.news.as_str()),
            ("instant_answer", self.instant_answer.as_str()),
            ("encyclopedia_search", self.encyclopedia_search.as_str()),
            ("encyclopedia_summary", self.encyclopedia_summary.as_str()),
            ("encyclopedia_article", self.encyclopedia_article.as_str()),
            ("academic", self.academic.as_str()),
        ]
        .into_iter()
        .chain(self.meta_search.iter().map(|u| ("meta_search", u.as_str())))
    }
}

impl SearchConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `timeout_ms` must be greater than 0
    /// - `request_timeout_seconds` must be greater than 0
    /// - `default_location` must not be blank
    /// - no endpoint may be blank
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.timeout_ms == 0 {
            return Err(SearchError::Config(
                "timeout_ms must be greater than 0".into(),
            ));
        }
        if self.request_timeout_seconds == 0 {
            return Err(SearchError::Config(
                "request_timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.default_location.trim().is_empty() {
            return Err(SearchError::Config(
                "default_location must not be empty".into(),
            ));
        }
        if let Some((name, _)) = self.endpoints.all().find(|(_, url)| url.trim().is_empty()) {
            return Err(SearchError::Config(format!(
                "endpoint `{name}` must not be empty"
            )));
        }
        Ok(())
    }

    /// Default overall deadline as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Cache time-to-live as a [`Duration`].
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }
}
