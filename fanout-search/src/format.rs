//! Plain-text digest of a response for a downstream text-generation client.

use crate::types::{AggregatedResponse, DomainTag};

/// Returned when a response carries no items.
pub const NO_RESULTS_TEXT: &str = "No current internet information found for this query.";

const HEADER: &str = "=== INTERNET SEARCH RESULTS ===";
const TRAILER: &str = "=== END SEARCH RESULTS ===";
const FALLBACK_NOTE: &str =
    "Note: These results are from fallback search due to connectivity issues.";
const INSTRUCTIONS: &str = "Instructions: Use this information to provide detailed, accurate, and up-to-date responses. Cite sources when possible and provide thorough explanations.";

/// Render `response` as a numbered digest.
///
/// Layout: a header with the query, the number of successful sources and
/// the classification tags; one block per item (title, source, full
/// content, optional enrichment, URL and publication date); a fallback
/// note when applicable; a trailer with citation instructions.
pub fn format_for_consumption(response: &AggregatedResponse) -> String {
    if response.items.is_empty() {
        return NO_RESULTS_TEXT.to_owned();
    }

    let tags = if response.metadata.tags.is_empty() {
        DomainTag::General.to_string()
    } else {
        response
            .metadata
            .tags
            .iter()
            .map(DomainTag::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    };

    let mut out = String::new();
    out.push_str(&format!("{HEADER}\n"));
    out.push_str(&format!("Query: \"{}\"\n", response.query));
    out.push_str(&format!(
        "Sources: {} successful sources\n",
        response.metadata.successful_sources
    ));
    out.push_str(&format!("Query Types: {tags}\n\n"));

    for (index, item) in response.items.iter().enumerate() {
        out.push_str(&format!("[{}] {}\n", index + 1, item.title));
        out.push_str(&format!("Source: {}\n", item.source));
        if !item.content.is_empty() {
            out.push_str(&format!("Content: {}\n", item.content));
        }
        if let Some(extra) = &item.enrichment {
            out.push_str(&format!("Details: {extra}\n"));
        }
        if !item.url.is_empty() {
            out.push_str(&format!("URL: {}\n", item.url));
        }
        if let Some(published) = item.published_at {
            out.push_str(&format!("Published: {}\n", published.format("%Y-%m-%d")));
        }
        out.push_str("\n---\n\n");
    }

    if response.is_fallback {
        out.push_str(&format!("{FALLBACK_NOTE}\n\n"));
    }

    out.push_str(&format!("{TRAILER}\n\n{INSTRUCTIONS}\n"));
    out
}
