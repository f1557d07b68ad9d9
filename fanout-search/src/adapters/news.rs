//! News adapter.
//!
//! With an API key configured, queries the news search endpoint sorted by
//! publication time. Without one, returns a fixed pair of pointer items to
//! general news outlets so news-tagged queries still surface something.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::adapter::SourceAdapter;
use crate::error::SearchError;
use crate::http;
use crate::registry::SourceDescriptor;
use crate::types::{ContentKind, SearchItem};

/// Pointer items returned when no API key is configured.
pub fn pointer_items(source_name: &str, now: DateTime<Utc>) -> Vec<SearchItem> {
    vec![
        SearchItem::new(
            "Latest Technology Updates",
            "Stay updated with the latest developments in technology, AI, and software development. Check major news sources for current headlines and breaking news.",
            "https://news.ycombinator.com",
            source_name,
            ContentKind::News,
        )
        .detailed(true)
        .published(now),
        SearchItem::new(
            "Current Events and World News",
            "For the most current news and events, please visit reputable news sources like BBC, Reuters, or AP News for up-to-date information.",
            "https://www.bbc.com/news",
            source_name,
            ContentKind::News,
        )
        .detailed(true)
        .published(now),
    ]
}

#[derive(Debug, Deserialize)]
struct NewsResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Article {
    title: Option<String>,
    description: Option<String>,
    content: Option<String>,
    url: Option<String>,
    published_at: Option<String>,
}

/// Parse a news search response body into items.
///
/// # Errors
///
/// Returns [`SearchError::Parse`] for a malformed body and
/// [`SearchError::Http`] when the service reports an error status.
pub fn parse_articles(body: &str, source_name: &str) -> Result<Vec<SearchItem>, SearchError> {
    let response: NewsResponse = serde_json::from_str(body)
        .map_err(|e| SearchError::Parse(format!("invalid news response: {e}")))?;

    if !response.status.is_empty() && response.status != "ok" {
        return Err(SearchError::Http(format!(
            "news service error: {}",
            response.message.unwrap_or(response.status)
        )));
    }

    let items = response
        .articles
        .into_iter()
        .filter_map(|article| {
            let title = article.title.filter(|t| !t.trim().is_empty())?;
            let description = article
                .description
                .filter(|d| !d.trim().is_empty())
                .or(article.content.filter(|c| !c.trim().is_empty()));
            let detailed = description.is_some();
            let mut item = SearchItem::new(
                title,
                description.unwrap_or_else(|| "No description available".to_owned()),
                article.url.unwrap_or_default(),
                source_name,
                ContentKind::News,
            )
            .detailed(detailed);
            if let Some(at) = article
                .published_at
                .as_deref()
                .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            {
                item = item.published(at.with_timezone(&Utc));
            }
            Some(item)
        })
        .collect();
    Ok(items)
}

/// Authenticated news search, or pointer items when no key is set.
pub struct NewsAdapter {
    client: reqwest::Client,
    api_key: Option<String>,
}

impl NewsAdapter {
    pub fn new(client: reqwest::Client, api_key: Option<String>) -> Self {
        Self {
            client,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }
}

impl SourceAdapter for NewsAdapter {
    async fn execute(
        &self,
        source: &SourceDescriptor,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchItem>, SearchError> {
        let Some(api_key) = &self.api_key else {
            tracing::debug!(source = %source.name, "no news key configured, returning pointers");
            return Ok(pointer_items(&source.name, Utc::now())
                .into_iter()
                .take(max_results)
                .collect());
        };

        let page_size = max_results.to_string();
        let request = self
            .client
            .get(&source.endpoint)
            .query(&[
                ("q", query),
                ("pageSize", page_size.as_str()),
                ("sortBy", "publishedAt"),
            ])
            .header("X-Api-Key", api_key);
        let body = http::send_text(request, &source.name).await?;

        let mut items = parse_articles(&body, &source.name)?;
        items.truncate(max_results);
        Ok(items)
    }
}
