//! Shallow markup handling for snippets returned by sources.
//!
//! Sources with JSON APIs still embed HTML highlight markup and entities in
//! their snippets. These helpers turn such fragments into plain text without
//! attempting full document extraction.

use scraper::Html;

/// Strip tags from an HTML fragment, decode entities and collapse whitespace.
pub fn strip_markup(fragment: &str) -> String {
    if !fragment.contains('<') && !fragment.contains('&') {
        return collapse_whitespace(fragment);
    }
    let parsed = Html::parse_fragment(fragment);
    let text: String = parsed.root_element().text().collect();
    collapse_whitespace(&text)
}

/// Collapse every run of whitespace (including newlines) to a single space
/// and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
