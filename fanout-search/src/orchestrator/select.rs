//! Source selection from classification tags.

use std::collections::HashSet;

use crate::registry::{SourceDescriptor, SourceRegistry};
use crate::types::{DomainTag, SourceDomain};

/// Upper bound on sources dispatched for one query.
pub const MAX_SELECTED: usize = 6;

/// General sources appended when no tag pulled one in.
const GENERAL_SAFETY_NET: usize = 2;

/// Pick the working sources to query for `tags`.
///
/// For each tag, in order, every working source of the tag's domain is
/// appended. If none of those is general-purpose, up to two working
/// general sources are appended. The list is then deduplicated by name
/// (first occurrence wins) and truncated to [`MAX_SELECTED`].
pub fn select(registry: &SourceRegistry, tags: &[DomainTag]) -> Vec<SourceDescriptor> {
    let mut candidates: Vec<SourceDescriptor> = tags
        .iter()
        .flat_map(|tag| registry.working_in(tag.source_domain()))
        .collect();

    if !candidates.iter().any(|s| s.domain == SourceDomain::General) {
        candidates.extend(
            registry
                .working_in(SourceDomain::General)
                .into_iter()
                .take(GENERAL_SAFETY_NET),
        );
    }

    let mut seen = HashSet::new();
    candidates.retain(|s| seen.insert(s.name.clone()));
    candidates.truncate(MAX_SELECTED);

    tracing::debug!(
        selected = candidates.len(),
        names = ?candidates.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
        "sources selected"
    );
    candidates
}
