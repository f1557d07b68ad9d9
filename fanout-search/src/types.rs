//! Core types: domain tags, source identity, result items and responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Classification label describing what kind of information a query seeks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainTag {
    /// Current conditions and forecasts.
    Weather,
    /// Headlines and current events.
    News,
    /// Anything time-sensitive ("now", "live", ...).
    Realtime,
    /// How-to, programming and documentation queries.
    Technical,
    /// Research papers and studies.
    Academic,
    /// Catch-all when nothing more specific matches.
    General,
}

impl DomainTag {
    /// Returns the lowercase label for this tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weather => "weather",
            Self::News => "news",
            Self::Realtime => "realtime",
            Self::Technical => "technical",
            Self::Academic => "academic",
            Self::General => "general",
        }
    }

    /// The source domain whose sources answer queries carrying this tag.
    ///
    /// `general`, `technical` and `realtime` all pull general-purpose sources.
    pub fn source_domain(&self) -> SourceDomain {
        match self {
            Self::Weather => SourceDomain::Weather,
            Self::News => SourceDomain::News,
            Self::Academic => SourceDomain::Academic,
            Self::General | Self::Technical | Self::Realtime => SourceDomain::General,
        }
    }
}

impl fmt::Display for DomainTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain a source is registered under in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceDomain {
    Weather,
    News,
    General,
    Academic,
}

impl SourceDomain {
    /// Returns the lowercase label for this domain.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weather => "weather",
            Self::News => "news",
            Self::General => "general",
            Self::Academic => "academic",
        }
    }
}

impl fmt::Display for SourceDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Adapter family: which protocol a source speaks.
///
/// Several sources may share a family (e.g. two meta-search instances).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFamily {
    /// Geocode, then coordinate-based forecast.
    Weather,
    /// Headline pointers, or an authenticated news API when configured.
    News,
    /// Instant-answer JSON API (abstract / definition / related topics).
    InstantAnswer,
    /// Encyclopedic search followed by per-article summaries.
    Encyclopedia,
    /// Self-hosted meta-search instance with a JSON result list.
    MetaSearch,
    /// Academic Atom feed.
    Academic,
}

impl SourceFamily {
    /// Returns the snake_case label for this family.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weather => "weather",
            Self::News => "news",
            Self::InstantAnswer => "instant_answer",
            Self::Encyclopedia => "encyclopedia",
            Self::MetaSearch => "meta_search",
            Self::Academic => "academic",
        }
    }
}

impl fmt::Display for SourceFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What kind of content a result item carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Weather,
    News,
    General,
    Academic,
    /// Synthetic item produced by the engine itself (e.g. "unavailable").
    System,
}

/// A single result item produced by a source adapter.
///
/// Adapters fill in the descriptive fields; the aggregator fills in
/// `source_relevance` and `item_score`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchItem {
    /// Headline for the item.
    pub title: String,
    /// Full, untruncated body text.
    pub content: String,
    /// Link to the original content. May be empty.
    pub url: String,
    /// Name of the source that produced this item.
    pub source: String,
    /// Kind of content carried.
    pub kind: ContentKind,
    /// Whether the body is a rich, detailed description.
    pub detailed: bool,
    /// Publication time, when the source reports one.
    pub published_at: Option<DateTime<Utc>>,
    /// Structured raw payload (e.g. the forecast JSON).
    pub data: Option<serde_json::Value>,
    /// Supplemental text attached by the enrichment pass.
    pub enrichment: Option<String>,
    /// Relevance of the originating source to the query tags.
    pub source_relevance: f64,
    /// Content-derived score of this item.
    pub item_score: f64,
}

impl SearchItem {
    /// Create an unscored item with the given descriptive fields.
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        url: impl Into<String>,
        source: impl Into<String>,
        kind: ContentKind,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            url: url.into(),
            source: source.into(),
            kind,
            detailed: false,
            published_at: None,
            data: None,
            enrichment: None,
            source_relevance: 0.0,
            item_score: 0.0,
        }
    }

    /// Mark the item as carrying detailed content.
    pub fn detailed(mut self, detailed: bool) -> Self {
        self.detailed = detailed;
        self
    }

    /// Attach a publication timestamp.
    pub fn published(mut self, at: DateTime<Utc>) -> Self {
        self.published_at = Some(at);
        self
    }

    /// Attach a structured payload.
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Final ranking key: item score plus source relevance.
    pub fn total_score(&self) -> f64 {
        self.item_score + self.source_relevance
    }
}

/// How a single source's invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// Returned items (possibly none).
    Succeeded,
    /// Failed every attempt.
    Failed,
    /// Still running when the overall deadline elapsed.
    TimedOut,
}

/// Per-source summary included in response metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceReport {
    pub name: String,
    pub domain: SourceDomain,
    pub status: OutcomeStatus,
    /// Items the source returned (0 unless it succeeded).
    pub count: usize,
    pub error: Option<String>,
}

/// Outcome metadata attached to every aggregated response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseMetadata {
    /// Number of sources the fan-out dispatched to.
    pub total_sources: usize,
    /// Number of sources that returned successfully.
    pub successful_sources: usize,
    /// Classification tags the query was routed with.
    pub tags: Vec<DomainTag>,
    /// One report per dispatched source, in selection order.
    pub sources: Vec<SourceReport>,
}

/// Final ranked, deduplicated response returned by a search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregatedResponse {
    /// The query text as the caller supplied it.
    pub query: String,
    /// Items in rank order, highest first.
    pub items: Vec<SearchItem>,
    pub metadata: ResponseMetadata,
    /// Set when the items come from the fallback chain.
    pub is_fallback: bool,
    /// Which fallback step produced the items.
    pub fallback_source: Option<String>,
    /// Explanation when the search short-circuited or degraded.
    pub notice: Option<String>,
}

impl AggregatedResponse {
    /// An empty response carrying only an explanation, with no network
    /// activity behind it.
    pub fn short_circuit(query: &str, notice: impl Into<String>) -> Self {
        Self {
            query: query.to_owned(),
            notice: Some(notice.into()),
            ..Default::default()
        }
    }

    /// Whether the response carries no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Per-call search options.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Caps the items each adapter returns and the final list length.
    pub max_results: usize,
    /// Run the enrichment pass over the top ranked items.
    pub include_detailed: bool,
    /// Skip the cache read (the result is still cached afterwards).
    pub force_refresh: bool,
    /// Overall deadline. `None` uses the configured default.
    pub timeout: Option<Duration>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_results: 10,
            include_detailed: true,
            force_refresh: false,
            timeout: None,
        }
    }
}

/// Health summary of one registered source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceStatus {
    pub name: String,
    pub family: SourceFamily,
    pub domain: SourceDomain,
    pub working: bool,
    pub direct_access: bool,
    pub consecutive_failures: u32,
}

/// Snapshot returned by `SearchService::stats`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchStats {
    pub enabled: bool,
    pub cache_size: u64,
    pub last_query: Option<String>,
    pub sources: Vec<SourceStatus>,
}
