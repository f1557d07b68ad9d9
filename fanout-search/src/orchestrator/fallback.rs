//! Degraded-mode chain used when the fan-out fails as a whole.
//!
//! Steps, tried in order until one yields items:
//!
//! 1. A single attempt against the registry's dependable encyclopedic
//!    source, bounded by the search deadline.
//! 2. A synthetic item saying search is temporarily unavailable. Always
//!    succeeds.

use std::time::Duration;

use crate::adapter::SourceAdapter;
use crate::error::SearchError;
use crate::registry::SourceRegistry;
use crate::types::{AggregatedResponse, ContentKind, DomainTag, SearchItem};

use super::aggregate::aggregate;
use super::fanout::{SourceOutcome, SourceRun};

/// Title of the synthetic unavailable item.
pub const UNAVAILABLE_TITLE: &str = "Search Temporarily Unavailable";

/// Source name of synthetic items.
pub const SYSTEM_SOURCE: &str = "System";

/// The single synthetic "unavailable" item for `query`.
pub fn unavailable_item(query: &str) -> SearchItem {
    SearchItem::new(
        UNAVAILABLE_TITLE,
        format!(
            "I'm currently unable to search for \"{query}\" due to network limitations. Please try again in a moment, or ask me something from my existing knowledge base."
        ),
        "",
        SYSTEM_SOURCE,
        ContentKind::System,
    )
}

/// Run the fallback chain. Never fails.
///
/// `reason` is the operation-level error that triggered the fallback and
/// is reported in the response notice.
pub async fn run_fallback<A: SourceAdapter>(
    adapter: &A,
    registry: &SourceRegistry,
    query: &str,
    tags: &[DomainTag],
    max_results: usize,
    timeout: Duration,
    reason: &SearchError,
) -> AggregatedResponse {
    tracing::warn!(error = %reason, "primary search failed, using fallback");

    let mut response = match dependable(adapter, registry, query, tags, max_results, timeout).await {
        Some(response) => response,
        None => system_message(query, tags),
    };
    response.is_fallback = true;
    response.notice = Some(format!("advanced search failed: {reason}"));
    tracing::debug!(
        fallback_source = ?response.fallback_source,
        items = response.items.len(),
        "fallback produced response"
    );
    response
}

async fn dependable<A: SourceAdapter>(
    adapter: &A,
    registry: &SourceRegistry,
    query: &str,
    tags: &[DomainTag],
    max_results: usize,
    timeout: Duration,
) -> Option<AggregatedResponse> {
    let source = registry.dependable()?;
    let attempt = tokio::time::timeout(timeout, adapter.execute(&source, query, max_results)).await;

    let items = match attempt {
        Ok(Ok(items)) if !items.is_empty() => items,
        Ok(Ok(_)) => {
            tracing::debug!(source = %source.name, "dependable source returned nothing");
            return None;
        }
        Ok(Err(err)) => {
            tracing::warn!(source = %source.name, error = %err, "dependable source failed");
            return None;
        }
        Err(_) => {
            tracing::warn!(source = %source.name, "dependable source timed out");
            return None;
        }
    };

    registry.record_success(&source.name);
    let label = format!("Fallback ({})", source.name);
    let runs = vec![SourceRun {
        source,
        outcome: SourceOutcome::Succeeded(items),
    }];
    let mut response = aggregate(query, runs, tags);
    response.items.truncate(max_results);
    response.fallback_source = Some(label);
    Some(response)
}

fn system_message(query: &str, tags: &[DomainTag]) -> AggregatedResponse {
    let mut response = AggregatedResponse {
        query: query.to_owned(),
        items: vec![unavailable_item(query)],
        fallback_source: Some("System Message".to_owned()),
        ..Default::default()
    };
    response.metadata.tags = tags.to_vec();
    response
}
