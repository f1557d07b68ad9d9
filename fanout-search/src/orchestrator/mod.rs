//! Search pipeline: classify, select, fan out, aggregate, fall back.
//!
//! A query is tagged by [`classify`], mapped to working sources by
//! [`select`], run concurrently with retries under a shared deadline by
//! [`fanout::run`], then merged by [`aggregate`] into one ranked,
//! deduplicated response. When the fan-out fails as a whole,
//! [`fallback::run_fallback`] produces a degraded response instead.

pub mod aggregate;
pub mod classify;
pub mod dedup;
pub mod enrich;
pub mod fallback;
pub mod fanout;
pub mod scoring;
pub mod select;

pub use aggregate::{aggregate, aggregate_at};
pub use classify::classify;
pub use enrich::{Enricher, NoopEnricher};
pub use fanout::{RetryPolicy, SourceOutcome, SourceRun};
pub use select::select;
