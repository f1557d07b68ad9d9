//! Error types for the fanout-search crate.
//!
//! All errors use stable string messages suitable for display to users
//! and programmatic handling. No API keys or query text appear in
//! error messages.

/// Errors that can occur while querying sources or running a fan-out.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SearchError {
    /// A request to a source failed at the transport level or returned a
    /// non-success status.
    #[error("HTTP error: {0}")]
    Http(String),

    /// A source answered with a payload that could not be interpreted.
    #[error("parse error: {0}")]
    Parse(String),

    /// A source was reachable but had nothing to return, and the adapter
    /// treats that as a failure.
    #[error("no results: {0}")]
    NoResults(String),

    /// The fan-out deadline elapsed before any source settled.
    #[error("search timed out: {0}")]
    Timeout(String),

    /// Source selection produced no candidates to query.
    #[error("no sources available: {0}")]
    NoSources(String),

    /// Invalid search configuration.
    #[error("config error: {0}")]
    Config(String),
}

impl SearchError {
    /// Whether this error means the whole fan-out failed, as opposed to a
    /// single source failing.
    ///
    /// Operation-level errors route the request through the fallback chain.
    pub fn is_operation_level(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::NoSources(_))
    }
}

/// Convenience type alias for fanout-search results.
pub type Result<T> = std::result::Result<T, SearchError>;
