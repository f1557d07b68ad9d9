//! Optional enrichment pass over the top-ranked items.

use crate::types::SearchItem;

/// Items, from the top of the ranking, offered to the enricher.
pub const ENRICH_TOP: usize = 3;

/// Attaches supplemental text to a ranked item.
///
/// Implementations only produce text; the pass stores it in
/// [`SearchItem::enrichment`] and never touches identity, scores or order.
pub trait Enricher: Send + Sync {
    fn enrich(&self, item: &SearchItem) -> Option<String>;
}

/// Enricher that adds nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEnricher;

impl Enricher for NoopEnricher {
    fn enrich(&self, _item: &SearchItem) -> Option<String> {
        None
    }
}

/// Run `enricher` over the first [`ENRICH_TOP`] items.
pub fn enrich_top(items: &mut [SearchItem], enricher: &dyn Enricher) {
    for item in items.iter_mut().take(ENRICH_TOP) {
        if let Some(extra) = enricher.enrich(item) {
            item.enrichment = Some(extra);
        }
    }
}
