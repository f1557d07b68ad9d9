//! Rendering of responses and engine state for the terminal.

use fanout_search::{format_for_consumption, AggregatedResponse, SearchStats, SourceStatus};

use crate::config::OutputFormat;
use crate::error::Result;

/// Render a response in the requested format.
///
/// # Errors
///
/// Returns [`crate::AppError::Json`] if JSON encoding fails.
pub fn render_response(response: &AggregatedResponse, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(format_for_consumption(response)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(response)?),
    }
}

/// Render engine stats in the requested format.
///
/// # Errors
///
/// Returns [`crate::AppError::Json`] if JSON encoding fails.
pub fn render_stats(stats: &SearchStats, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(stats)?);
    }

    let mut out = String::new();
    out.push_str(&format!(
        "search: {}\n",
        if stats.enabled { "enabled" } else { "disabled" }
    ));
    out.push_str(&format!("cached responses: {}\n", stats.cache_size));
    out.push_str(&format!(
        "last query: {}\n",
        stats.last_query.as_deref().unwrap_or("(none)")
    ));
    out.push_str(&render_sources(&stats.sources));
    Ok(out)
}

/// One line per source: name, family, domain and health.
pub fn render_sources(sources: &[SourceStatus]) -> String {
    let mut out = String::from("sources:\n");
    for source in sources {
        let health = if source.working { "working" } else { "not working" };
        out.push_str(&format!(
            "  {} [{} / {}] {health}, failures: {}{}\n",
            source.name,
            source.family,
            source.domain.as_str(),
            source.consecutive_failures,
            if source.direct_access { "" } else { ", proxied" },
        ));
    }
    out
}
