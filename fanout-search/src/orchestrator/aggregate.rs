//! Merge per-source outcomes into one ranked, deduplicated response.

use chrono::{DateTime, Utc};

use crate::types::{AggregatedResponse, DomainTag, OutcomeStatus, ResponseMetadata, SearchItem, SourceReport};

use super::dedup::deduplicate;
use super::fanout::{SourceOutcome, SourceRun};
use super::scoring::{item_score, source_relevance};

/// Aggregate outcomes using the current time for recency scoring.
pub fn aggregate(query: &str, runs: Vec<SourceRun>, tags: &[DomainTag]) -> AggregatedResponse {
    aggregate_at(query, runs, tags, Utc::now())
}

/// Aggregate outcomes with recency measured from `now`.
///
/// # Pipeline
///
/// 1. Summarise every run into a [`SourceReport`]
/// 2. Score each item from a successful run (source relevance + item score)
/// 3. Stable sort by total score, descending, so ties keep source order
/// 4. Deduplicate, keeping the first (highest-ranked) occurrence
///
/// Deterministic for fixed inputs and `now`.
pub fn aggregate_at(
    query: &str,
    runs: Vec<SourceRun>,
    tags: &[DomainTag],
    now: DateTime<Utc>,
) -> AggregatedResponse {
    let mut reports = Vec::with_capacity(runs.len());
    let mut items: Vec<SearchItem> = Vec::new();

    for run in runs {
        let (status, count, error) = match &run.outcome {
            SourceOutcome::Succeeded(found) => (OutcomeStatus::Succeeded, found.len(), None),
            SourceOutcome::Failed(reason) => (OutcomeStatus::Failed, 0, Some(reason.clone())),
            SourceOutcome::TimedOut => (OutcomeStatus::TimedOut, 0, None),
        };
        reports.push(SourceReport {
            name: run.source.name.clone(),
            domain: run.source.domain,
            status,
            count,
            error,
        });

        if let SourceOutcome::Succeeded(found) = run.outcome {
            let relevance = source_relevance(run.source.domain, tags);
            items.extend(found.into_iter().map(|mut item| {
                item.source_relevance = relevance;
                item.item_score = item_score(&item, tags, now);
                item
            }));
        }
    }

    items.sort_by(|a, b| b.total_score().total_cmp(&a.total_score()));
    let items = deduplicate(items);

    let successful_sources = reports
        .iter()
        .filter(|r| r.status == OutcomeStatus::Succeeded)
        .count();
    tracing::debug!(
        items = items.len(),
        total_sources = reports.len(),
        successful_sources,
        "outcomes aggregated"
    );

    AggregatedResponse {
        query: query.to_owned(),
        items,
        metadata: ResponseMetadata {
            total_sources: reports.len(),
            successful_sources,
            tags: tags.to_vec(),
            sources: reports,
        },
        ..Default::default()
    }
}
