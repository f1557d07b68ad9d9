//! Command-line host for the `fanout_search` engine.
//!
//! Loads a TOML [`AppConfig`], builds a search service from it, and prints
//! responses as the plain-text digest or as JSON. The interactive
//! [`repl`] also exposes the engine's toggle, cache and source-health
//! operations.

pub mod config;
pub mod error;
pub mod output;
pub mod repl;

pub use config::{default_config_path, AppConfig, OutputConfig, OutputFormat};
pub use error::{AppError, Result};
