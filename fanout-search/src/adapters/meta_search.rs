//! Meta-search adapter for self-hosted aggregator instances.
//!
//! Public instances often reject direct requests, so fetches go through
//! [`ProxyFetcher`], which falls back to reverse proxies unless the source
//! is marked as directly accessible.

use std::sync::Arc;

use serde_json::Value;
use url::Url;

use crate::adapter::SourceAdapter;
use crate::error::SearchError;
use crate::http::ProxyFetcher;
use crate::registry::SourceDescriptor;
use crate::types::{ContentKind, SearchItem};

/// Upstream engines the instance is asked to aggregate.
const ENGINES: &str = "duckduckgo,bing,google";

/// Build the JSON search URL for an instance base URL.
///
/// # Errors
///
/// Returns [`SearchError::Config`] if `base` is not a valid URL.
pub fn search_url(base: &str, query: &str) -> Result<Url, SearchError> {
    let mut url = Url::parse(base)
        .and_then(|b| b.join("/search"))
        .map_err(|e| SearchError::Config(format!("invalid meta-search base {base:?}: {e}")))?;
    url.query_pairs_mut()
        .append_pair("q", query)
        .append_pair("format", "json")
        .append_pair("engines", ENGINES)
        .append_pair("categories", "general");
    Ok(url)
}

fn non_empty<'a>(result: &'a Value, key: &str) -> Option<&'a str> {
    result.get(key)?.as_str().filter(|s| !s.trim().is_empty())
}

/// Parse a meta-search JSON body into at most `max_results` items.
///
/// # Errors
///
/// Returns [`SearchError::Parse`] if the body is not JSON or has no
/// `results` list.
pub fn parse_results(
    body: &str,
    source_name: &str,
    max_results: usize,
) -> Result<Vec<SearchItem>, SearchError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| SearchError::Parse(format!("invalid meta-search response: {e}")))?;
    let results = value
        .get("results")
        .and_then(Value::as_array)
        .ok_or_else(|| SearchError::Parse("meta-search response has no results list".into()))?;

    Ok(results
        .iter()
        .take(max_results)
        .map(|result| {
            let content = non_empty(result, "content")
                .or_else(|| non_empty(result, "description"))
                .unwrap_or("No description available");
            SearchItem::new(
                non_empty(result, "title").unwrap_or("No title"),
                content,
                non_empty(result, "url").unwrap_or_default(),
                source_name,
                ContentKind::General,
            )
        })
        .collect())
}

/// Self-hosted meta-search instance.
pub struct MetaSearchAdapter {
    fetcher: Arc<ProxyFetcher>,
}

impl MetaSearchAdapter {
    pub fn new(fetcher: Arc<ProxyFetcher>) -> Self {
        Self { fetcher }
    }
}

impl SourceAdapter for MetaSearchAdapter {
    async fn execute(
        &self,
        source: &SourceDescriptor,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchItem>, SearchError> {
        let url = search_url(&source.endpoint, query)?;
        let body = self
            .fetcher
            .fetch_text(url.as_str(), source.direct_access, &source.name)
            .await?;
        parse_results(&body, &source.name, max_results)
    }
}
