//! Error types for the fanout host.

/// Errors raised while loading configuration or rendering output.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Unreadable or unwritable configuration file.
    #[error("config error: {0}")]
    Config(String),

    /// The engine rejected its configuration or failed to start.
    #[error("search error: {0}")]
    Search(#[from] fanout_search::SearchError),

    /// A response could not be encoded as JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, AppError>;
