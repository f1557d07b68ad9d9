//! Item deduplication by truncated title and URL.
//!
//! Two items are the same when the first 50 characters of their lowercased
//! titles match and their URLs match exactly. The first occurrence wins,
//! so callers sort before deduplicating.

use std::collections::HashSet;

use crate::types::SearchItem;

/// Title characters that take part in the key.
const TITLE_KEY_CHARS: usize = 50;

/// The identity key for `item`.
pub fn dedup_key(item: &SearchItem) -> (String, String) {
    let title: String = item.title.to_lowercase().chars().take(TITLE_KEY_CHARS).collect();
    (title, item.url.clone())
}

/// Drop every item whose key was already seen, preserving order.
pub fn deduplicate(items: Vec<SearchItem>) -> Vec<SearchItem> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(dedup_key(item)))
        .collect()
}
