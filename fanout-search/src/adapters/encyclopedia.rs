//! Encyclopedia adapter: full-text search followed by per-article summaries.
//!
//! The search step must succeed with at least one hit. Summary lookups for
//! the top hits are best-effort; a failed lookup degrades to the search
//! snippet with markup removed.

use futures::future::join_all;
use serde::Deserialize;

use crate::adapter::SourceAdapter;
use crate::error::SearchError;
use crate::http;
use crate::markup::strip_markup;
use crate::registry::SourceDescriptor;
use crate::types::{ContentKind, SearchItem};

/// Hits for which a summary is fetched.
const SUMMARY_LIMIT: usize = 3;

const NO_DESCRIPTION: &str = "No description available";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    query: Option<SearchQuery>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

/// One full-text search hit.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchHit {
    pub title: String,
    #[serde(default)]
    pub snippet: String,
}

#[derive(Debug, Deserialize)]
struct Summary {
    #[serde(default)]
    extract: String,
}

/// Parse a full-text search response.
///
/// # Errors
///
/// Returns [`SearchError::Parse`] for a malformed body and
/// [`SearchError::NoResults`] when the search matched nothing.
pub fn parse_search(body: &str) -> Result<Vec<SearchHit>, SearchError> {
    let response: SearchResponse = serde_json::from_str(body)
        .map_err(|e| SearchError::Parse(format!("invalid encyclopedia search response: {e}")))?;
    let hits = response.query.map(|q| q.search).unwrap_or_default();
    if hits.is_empty() {
        return Err(SearchError::NoResults(
            "encyclopedia search matched no articles".into(),
        ));
    }
    Ok(hits)
}

/// Parse a summary body into its extract, if non-empty.
pub fn parse_summary(body: &str) -> Option<String> {
    serde_json::from_str::<Summary>(body)
        .ok()
        .map(|s| s.extract.trim().to_owned())
        .filter(|e| !e.is_empty())
}

/// Build the item for a hit given the (possibly failed) summary lookup.
pub fn hit_to_item(
    hit: &SearchHit,
    summary: Option<String>,
    article_url: String,
    source_name: &str,
) -> SearchItem {
    match summary {
        Some(extract) => {
            SearchItem::new(&hit.title, extract, article_url, source_name, ContentKind::General)
                .detailed(true)
        }
        None => {
            let snippet = strip_markup(&hit.snippet);
            let content = if snippet.is_empty() {
                NO_DESCRIPTION.to_owned()
            } else {
                snippet
            };
            SearchItem::new(&hit.title, content, article_url, source_name, ContentKind::General)
        }
    }
}

/// Encyclopedic search source.
///
/// The descriptor's endpoint is the search API; summary and article URL
/// prefixes are configured separately.
pub struct EncyclopediaAdapter {
    client: reqwest::Client,
    summary_base: String,
    article_base: String,
}

impl EncyclopediaAdapter {
    pub fn new(client: reqwest::Client, summary_base: String, article_base: String) -> Self {
        Self {
            client,
            summary_base,
            article_base,
        }
    }

    async fn summary(&self, title: &str, label: &str) -> Option<String> {
        let url = format!("{}{}", self.summary_base, urlencoding::encode(title));
        match http::send_text(self.client.get(&url), label).await {
            Ok(body) => parse_summary(&body),
            Err(e) => {
                tracing::debug!(title, error = %e, "summary lookup failed, using snippet");
                None
            }
        }
    }
}

impl SourceAdapter for EncyclopediaAdapter {
    async fn execute(
        &self,
        source: &SourceDescriptor,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchItem>, SearchError> {
        let limit = max_results.to_string();
        let request = self.client.get(&source.endpoint).query(&[
            ("action", "query"),
            ("list", "search"),
            ("srsearch", query),
            ("format", "json"),
            ("srlimit", limit.as_str()),
        ]);
        let body = http::send_text(request, &source.name).await?;
        let hits = parse_search(&body)?;

        let top: Vec<&SearchHit> = hits.iter().take(SUMMARY_LIMIT.min(max_results)).collect();
        let summaries = join_all(top.iter().map(|hit| self.summary(&hit.title, &source.name))).await;

        Ok(top
            .into_iter()
            .zip(summaries)
            .map(|(hit, summary)| {
                let url = format!("{}{}", self.article_base, urlencoding::encode(&hit.title));
                hit_to_item(hit, summary, url, &source.name)
            })
            .collect())
    }
}
