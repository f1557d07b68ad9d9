//! Shared HTTP client with User-Agent rotation, plus reverse-proxy fallback.
//!
//! Provides a configured [`reqwest::Client`] with browser-like headers and
//! rotating User-Agent strings, a helper that reads a response body after
//! checking its status, and [`ProxyFetcher`] for sources that reject direct
//! requests from restricted origins.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use rand::seq::SliceRandom;

use crate::config::SearchConfig;
use crate::error::SearchError;

/// Realistic browser User-Agent strings, rotated per client.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:133.0) Gecko/20100101 Firefox/133.0",
];

/// Build a [`reqwest::Client`] configured for source requests.
///
/// The client has:
/// - Per-request timeout from config
/// - Random User-Agent from built-in rotation list (or custom if configured)
/// - Brotli and gzip decompression
///
/// # Errors
///
/// Returns [`SearchError::Http`] if the client cannot be constructed.
pub fn build_client(config: &SearchConfig) -> Result<reqwest::Client, SearchError> {
    let ua = match config.user_agent {
        Some(ref custom) => custom.clone(),
        None => random_user_agent().to_owned(),
    };

    reqwest::Client::builder()
        .cookie_store(true)
        .timeout(Duration::from_secs(config.request_timeout_seconds))
        .user_agent(ua)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| SearchError::Http(format!("failed to build HTTP client: {e}")))
}

/// Select a random User-Agent string from the rotation list.
pub fn random_user_agent() -> &'static str {
    let mut rng = rand::thread_rng();
    USER_AGENTS
        .choose(&mut rng)
        .copied()
        // SAFETY: USER_AGENTS is a non-empty const array, choose only returns None on empty slices
        .unwrap_or(USER_AGENTS[0])
}

/// Send a prepared request and read its body as text.
///
/// `label` names the source in error messages.
///
/// # Errors
///
/// Returns [`SearchError::Http`] on transport failure, a non-success status,
/// or an unreadable body.
pub async fn send_text(
    request: reqwest::RequestBuilder,
    label: &str,
) -> Result<String, SearchError> {
    let response = request
        .send()
        .await
        .map_err(|e| SearchError::Http(format!("{label} request failed: {e}")))?
        .error_for_status()
        .map_err(|e| SearchError::Http(format!("{label} HTTP error: {e}")))?;

    let body = response
        .text()
        .await
        .map_err(|e| SearchError::Http(format!("{label} response read failed: {e}")))?;

    tracing::trace!(source = label, bytes = body.len(), "response received");
    Ok(body)
}

/// Fetches URLs directly, falling back to a rotation of reverse proxies
/// when the direct request is rejected.
///
/// The index of the last proxy that worked is remembered and tried first
/// on the next fallback.
#[derive(Debug)]
pub struct ProxyFetcher {
    client: reqwest::Client,
    proxies: Vec<String>,
    current: AtomicUsize,
}

impl ProxyFetcher {
    /// Create a fetcher over `proxies`, each a prefix to which the
    /// percent-encoded target URL is appended.
    pub fn new(client: reqwest::Client, proxies: Vec<String>) -> Self {
        Self {
            client,
            proxies,
            current: AtomicUsize::new(0),
        }
    }

    /// GET `url` as text.
    ///
    /// When `direct_access` is true only the direct request is made.
    /// Otherwise a failed direct request is retried through each proxy
    /// in turn.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the direct request fails and either
    /// proxies are not allowed or every proxy fails as well.
    pub async fn fetch_text(
        &self,
        url: &str,
        direct_access: bool,
        label: &str,
    ) -> Result<String, SearchError> {
        let direct_err = match send_text(self.client.get(url), label).await {
            Ok(body) => return Ok(body),
            Err(err) => err,
        };
        if direct_access || self.proxies.is_empty() {
            return Err(direct_err);
        }

        tracing::debug!(
            source = label,
            error = %direct_err,
            "direct fetch failed, trying proxies"
        );

        let start = self.current.load(Ordering::Relaxed);
        for offset in 0..self.proxies.len() {
            let index = (start + offset) % self.proxies.len();
            let proxied = proxied_url(&self.proxies[index], url);
            match send_text(self.client.get(&proxied), label).await {
                Ok(body) => {
                    self.current.store(index, Ordering::Relaxed);
                    return Ok(body);
                }
                Err(err) => {
                    tracing::debug!(
                        source = label,
                        proxy = index,
                        error = %err,
                        "proxy fetch failed"
                    );
                }
            }
        }

        Err(SearchError::Http(format!(
            "{label}: direct request and all {} proxies failed",
            self.proxies.len()
        )))
    }

    /// Index of the proxy that will be tried first on the next fallback.
    pub fn current_proxy(&self) -> usize {
        self.current.load(Ordering::Relaxed)
    }
}

/// Build the proxied form of `url`: the prefix followed by the
/// percent-encoded target.
pub fn proxied_url(prefix: &str, url: &str) -> String {
    format!("{prefix}{}", urlencoding::encode(url))
}
