//! Relevance scoring for aggregated items.
//!
//! Two components are summed into the ranking key:
//!
//! - **Source relevance**: how well the item's source domain fits the query
//!   tags, from a fixed matrix, taking the best tag.
//! - **Item score**: content richness, recency (time-sensitive queries
//!   only), a detailed-content bonus and a reliable-source bonus.
//!
//! ```text
//! item = min(chars / 100, 5)
//!      + max(5 - days_since_published, 0)   if news/realtime and dated
//!      + 3                                  if detailed
//!      + 2                                  if source is reliable
//! ```

use chrono::{DateTime, Utc};

use crate::types::{DomainTag, SearchItem, SourceDomain};

/// Sources whose items get the reliability bonus.
pub const RELIABLE_SOURCES: &[&str] = &["Wikipedia", "DuckDuckGo", "Open-Meteo"];

/// Relevance for any (tag, domain) pair not in the matrix.
const DEFAULT_RELEVANCE: f64 = 1.0;

const CONTENT_DIVISOR: f64 = 100.0;
const CONTENT_CAP: f64 = 5.0;
const RECENCY_MAX: f64 = 5.0;
const DETAILED_BONUS: f64 = 3.0;
const RELIABLE_BONUS: f64 = 2.0;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Relevance of a source domain to a single query tag.
pub fn relevance(tag: DomainTag, domain: SourceDomain) -> f64 {
    use DomainTag as T;
    use SourceDomain as D;
    match (tag, domain) {
        (T::Weather, D::Weather) => 10.0,
        (T::Weather, D::General) => 3.0,
        (T::Weather, D::News) => 1.0,
        (T::News, D::News) => 10.0,
        (T::News, D::General) => 5.0,
        (T::News, D::Weather) => 1.0,
        (T::General, D::General) => 8.0,
        (T::General, D::News) => 6.0,
        (T::General, D::Weather) => 4.0,
        (T::Academic, D::Academic) => 10.0,
        (T::Academic, D::General) => 6.0,
        (T::Academic, D::News) => 2.0,
        _ => DEFAULT_RELEVANCE,
    }
}

/// Best relevance of `domain` over every tag in `tags`.
pub fn source_relevance(domain: SourceDomain, tags: &[DomainTag]) -> f64 {
    tags.iter()
        .map(|tag| relevance(*tag, domain))
        .fold(DEFAULT_RELEVANCE, f64::max)
}

/// Content-derived score of one item.
///
/// `now` anchors the recency decay so scoring is reproducible.
pub fn item_score(item: &SearchItem, tags: &[DomainTag], now: DateTime<Utc>) -> f64 {
    let mut score = (item.content.chars().count() as f64 / CONTENT_DIVISOR).min(CONTENT_CAP);

    let time_sensitive = tags
        .iter()
        .any(|t| matches!(t, DomainTag::News | DomainTag::Realtime));
    if time_sensitive {
        if let Some(published) = item.published_at {
            let days = ((now - published).num_seconds() as f64 / SECONDS_PER_DAY).max(0.0);
            score += (RECENCY_MAX - days).max(0.0);
        }
    }

    if item.detailed {
        score += DETAILED_BONUS;
    }
    if RELIABLE_SOURCES.contains(&item.source.as_str()) {
        score += RELIABLE_BONUS;
    }
    score
}
