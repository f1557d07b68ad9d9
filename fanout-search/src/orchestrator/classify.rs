//! Query classification by keyword patterns.
//!
//! Each tag owns one alternation pattern matched against the lowercased
//! query. Matching is by substring, so "snowfall" counts as weather and
//! "known" counts as realtime. A query that matches nothing is `general`.

use std::sync::OnceLock;

use regex::Regex;

use crate::types::DomainTag;

/// Tag patterns in the order tags are reported.
const TAG_PATTERNS: &[(DomainTag, &str)] = &[
    (
        DomainTag::Weather,
        r"weather|temperature|forecast|climate|rain|snow|wind|humidity|pressure|cloudy|sunny|storm|hot|cold",
    ),
    (
        DomainTag::News,
        r"news|latest|current events|breaking|happening|today|recent|headlines|update|2024|2025",
    ),
    (
        DomainTag::Realtime,
        r"now|current|live|real.?time|happening|right now|at the moment|present|today",
    ),
    (
        DomainTag::Technical,
        r"how to|tutorial|programming|code|api|documentation|algorithm|implementation|technical",
    ),
    (
        DomainTag::Academic,
        r"research|study|academic|paper|journal|scientific|analysis|methodology",
    ),
];

fn compiled() -> &'static [(DomainTag, Regex)] {
    static COMPILED: OnceLock<Vec<(DomainTag, Regex)>> = OnceLock::new();
    COMPILED.get_or_init(|| {
        TAG_PATTERNS
            .iter()
            .filter_map(|(tag, pattern)| Regex::new(pattern).ok().map(|re| (*tag, re)))
            .collect()
    })
}

/// Classify a query into a non-empty list of domain tags.
///
/// Tags appear in a fixed order (weather, news, realtime, technical,
/// academic). Returns exactly `[General]` when no pattern matches.
pub fn classify(query: &str) -> Vec<DomainTag> {
    let lowered = query.to_lowercase();
    let mut tags: Vec<DomainTag> = compiled()
        .iter()
        .filter(|(_, pattern)| pattern.is_match(&lowered))
        .map(|(tag, _)| *tag)
        .collect();

    if tags.is_empty() {
        tags.push(DomainTag::General);
    }
    tracing::debug!(?tags, "query classified");
    tags
}
