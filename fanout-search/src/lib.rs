//! # fanout-search
//!
//! Multi-source search fan-out for a text-generation client.
//!
//! A free-text query is classified into domain tags, routed to a bounded set
//! of working sources (weather, news, instant answers, encyclopedia,
//! meta-search, academic preprints), queried concurrently with per-source
//! retry under a shared deadline, and merged into one ranked, deduplicated
//! response. [`format_for_consumption`] renders that response as a textual
//! digest.
//!
//! ## Design
//!
//! - One [`SearchService`] holds all mutable state; there are no globals
//! - Individual source failures are absorbed into response metadata
//! - Whole-operation failures go through a fallback chain that always
//!   produces a response
//! - Responses are cached per (query, result limit) with a fixed TTL
//! - Sources that exhaust their retries are skipped until they recover
//!
//! ## Security
//!
//! - API keys are sent only as request headers and never logged
//! - No network listeners; this is a library, not a server
//! - Query text is logged only at trace level
//!
//! # Examples
//!
//! ```no_run
//! # async fn example() -> fanout_search::Result<()> {
//! use fanout_search::{format_for_consumption, SearchConfig, SearchOptions, SearchService};
//!
//! let service = SearchService::new(SearchConfig::default())?;
//! let response = service.search("weather in Tokyo", &SearchOptions::default()).await;
//! println!("{}", format_for_consumption(&response));
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod adapters;
pub mod cache;
pub mod config;
pub mod error;
pub mod format;
pub mod http;
pub mod markup;
pub mod orchestrator;
pub mod registry;
pub mod service;
pub mod types;

pub use adapter::SourceAdapter;
pub use adapters::SourceAdapters;
pub use config::{EndpointConfig, SearchConfig};
pub use error::{Result, SearchError};
pub use format::format_for_consumption;
pub use orchestrator::{classify, Enricher, NoopEnricher};
pub use registry::{SourceDescriptor, SourceRegistry};
pub use service::SearchService;
pub use types::{
    AggregatedResponse, ContentKind, DomainTag, OutcomeStatus, ResponseMetadata, SearchItem,
    SearchOptions, SearchStats, SourceDomain, SourceFamily, SourceReport, SourceStatus,
};
