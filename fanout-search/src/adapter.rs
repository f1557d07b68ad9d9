//! Trait definition for pluggable source adapters.
//!
//! Each source family (weather, news, instant answer, encyclopedia,
//! meta-search, academic) implements [`SourceAdapter`] to normalize its raw
//! response into [`SearchItem`] values. The fan-out executor is generic over
//! this trait, so tests can substitute scripted adapters.

use crate::error::SearchError;
use crate::registry::SourceDescriptor;
use crate::types::SearchItem;

/// A pluggable source backend.
///
/// Implementors handle their own:
///
/// - URL construction with query encoding
/// - HTTP request with appropriate headers
/// - Response parsing and normalization
/// - Mapping transport failures to [`SearchError`]
///
/// A source that is reachable but has nothing useful should return a valid,
/// possibly empty, item list rather than an error.
///
/// All implementations must be `Send + Sync` for concurrent source queries.
pub trait SourceAdapter: Send + Sync {
    /// Query `source` and return up to `max_results` normalized items.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] if the request fails or the response cannot
    /// be interpreted. The executor retries these.
    fn execute(
        &self,
        source: &SourceDescriptor,
        query: &str,
        max_results: usize,
    ) -> impl std::future::Future<Output = Result<Vec<SearchItem>, SearchError>> + Send;
}
