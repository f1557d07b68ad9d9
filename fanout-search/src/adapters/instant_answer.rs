//! Instant-answer adapter.
//!
//! Reads the abstract, definition and related topics from a JSON
//! instant-answer API and turns each present element into an item.

use serde::Deserialize;
use serde_json::Value;

use crate::adapter::SourceAdapter;
use crate::error::SearchError;
use crate::http;
use crate::registry::SourceDescriptor;
use crate::types::{ContentKind, SearchItem};

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct InstantAnswer {
    #[serde(rename = "Abstract")]
    abstract_html: String,
    abstract_text: String,
    #[serde(rename = "AbstractURL")]
    abstract_url: String,
    heading: String,
    definition: String,
    definition_text: String,
    #[serde(rename = "DefinitionURL")]
    definition_url: String,
    related_topics: Vec<Value>,
}

fn search_page(query: &str) -> String {
    format!("https://duckduckgo.com/?q={}", urlencoding::encode(query))
}

/// Parse an instant-answer body into at most `max_results` items.
///
/// # Errors
///
/// Returns [`SearchError::Parse`] if the body is not a JSON object.
pub fn parse_instant_answer(
    body: &str,
    query: &str,
    source_name: &str,
    max_results: usize,
) -> Result<Vec<SearchItem>, SearchError> {
    let answer: InstantAnswer = serde_json::from_str(body)
        .map_err(|e| SearchError::Parse(format!("invalid instant answer response: {e}")))?;

    let mut items = Vec::new();

    if !answer.abstract_html.is_empty() && !answer.abstract_text.is_empty() {
        let title = if answer.heading.is_empty() {
            "DuckDuckGo Answer".to_owned()
        } else {
            answer.heading.clone()
        };
        let url = if answer.abstract_url.is_empty() {
            search_page(query)
        } else {
            answer.abstract_url.clone()
        };
        items.push(
            SearchItem::new(title, answer.abstract_text, url, source_name, ContentKind::General)
                .detailed(true),
        );
    }

    if !answer.definition.is_empty() && !answer.definition_text.is_empty() {
        let url = if answer.definition_url.is_empty() {
            search_page(query)
        } else {
            answer.definition_url
        };
        items.push(
            SearchItem::new(
                "Definition",
                answer.definition_text,
                url,
                source_name,
                ContentKind::General,
            )
            .detailed(true),
        );
    }

    let remaining = max_results.saturating_sub(items.len());
    let related = answer
        .related_topics
        .iter()
        .take(remaining)
        .filter_map(|topic| {
            let text = topic.get("Text")?.as_str().filter(|t| !t.is_empty())?;
            let url = topic.get("FirstURL")?.as_str().filter(|u| !u.is_empty())?;
            let title = text.split(" - ").next().unwrap_or(text);
            Some(
                SearchItem::new(title, text, url, source_name, ContentKind::General)
                    .detailed(true),
            )
        });
    items.extend(related);

    items.truncate(max_results);
    Ok(items)
}

/// JSON instant-answer source.
pub struct InstantAnswerAdapter {
    client: reqwest::Client,
}

impl InstantAnswerAdapter {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl SourceAdapter for InstantAnswerAdapter {
    async fn execute(
        &self,
        source: &SourceDescriptor,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchItem>, SearchError> {
        let request = self.client.get(&source.endpoint).query(&[
            ("q", query),
            ("format", "json"),
            ("no_html", "1"),
            ("skip_disambig", "1"),
        ]);
        let body = http::send_text(request, &source.name).await?;
        let items = parse_instant_answer(&body, query, &source.name, max_results)?;
        tracing::debug!(source = %source.name, count = items.len(), "instant answer parsed");
        Ok(items)
    }
}
