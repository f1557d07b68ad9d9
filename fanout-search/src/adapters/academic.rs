//! Academic preprint adapter over an Atom feed query API.
//!
//! The feed is scanned entry by entry with shallow patterns instead of a
//! full XML parse. Malformed feeds yield no items rather than an error;
//! transport failures still propagate so the executor can retry.

use std::sync::OnceLock;

use regex::Regex;

use crate::adapter::SourceAdapter;
use crate::error::SearchError;
use crate::http;
use crate::markup::collapse_whitespace;
use crate::registry::SourceDescriptor;
use crate::types::{ContentKind, SearchItem};

/// Entries read from a single feed.
const MAX_ENTRIES: usize = 5;

struct FeedPatterns {
    title: Regex,
    summary: Regex,
    link: Regex,
}

fn patterns() -> Option<&'static FeedPatterns> {
    static PATTERNS: OnceLock<Option<FeedPatterns>> = OnceLock::new();
    PATTERNS
        .get_or_init(|| {
            Some(FeedPatterns {
                title: Regex::new(r"(?s)<title>(.*?)</title>").ok()?,
                summary: Regex::new(r"(?s)<summary>(.*?)</summary>").ok()?,
                link: Regex::new(r#"href="(.*?)""#).ok()?,
            })
        })
        .as_ref()
}

fn capture(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| collapse_whitespace(m.as_str()))
}

/// Parse an Atom feed body into items, reading at most five entries.
///
/// Entries without both a title and a summary are skipped.
pub fn parse_feed(body: &str, source_name: &str) -> Vec<SearchItem> {
    let Some(patterns) = patterns() else {
        return Vec::new();
    };

    body.split("<entry>")
        .skip(1)
        .take(MAX_ENTRIES)
        .filter_map(|entry| {
            let title = capture(&patterns.title, entry).filter(|t| !t.is_empty())?;
            let summary = capture(&patterns.summary, entry).filter(|s| !s.is_empty())?;
            let link = capture(&patterns.link, entry).unwrap_or_default();
            Some(
                SearchItem::new(title, summary, link, source_name, ContentKind::Academic)
                    .detailed(true),
            )
        })
        .collect()
}

/// Atom-feed academic search source.
pub struct AcademicAdapter {
    client: reqwest::Client,
}

impl AcademicAdapter {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl SourceAdapter for AcademicAdapter {
    async fn execute(
        &self,
        source: &SourceDescriptor,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchItem>, SearchError> {
        let search_query = format!("all:{query}");
        let limit = max_results.to_string();
        let request = self.client.get(&source.endpoint).query(&[
            ("search_query", search_query.as_str()),
            ("start", "0"),
            ("max_results", limit.as_str()),
        ]);
        let body = http::send_text(request, &source.name).await?;

        let mut items = parse_feed(&body, &source.name);
        items.truncate(max_results);
        Ok(items)
    }
}
