//! Line-oriented interactive loop.
//!
//! Each input line is either a command (prefixed with `:`) or a query.
//! Commands:
//!
//! - `:toggle` flips the search-enabled flag
//! - `:clear` drops cached responses
//! - `:reset` marks every source working again
//! - `:stats` prints engine state
//! - `:help` lists the commands
//! - `:quit` (or `:q`, or end of input) leaves the loop

use std::io::Write;

use fanout_search::{SearchOptions, SearchService, SourceAdapter};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::config::OutputFormat;
use crate::error::Result;
use crate::output::{render_response, render_stats};

const HELP: &str = "commands: :toggle  :clear  :reset  :stats  :help  :quit\nanything else is searched";

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line<'a> {
    Toggle,
    Clear,
    Reset,
    Stats,
    Help,
    Quit,
    Unknown(&'a str),
    Query(&'a str),
    Blank,
}

pub fn parse_line(line: &str) -> Line<'_> {
    let line = line.trim();
    if line.is_empty() {
        return Line::Blank;
    }
    let Some(command) = line.strip_prefix(':') else {
        return Line::Query(line);
    };
    match command.trim() {
        "toggle" => Line::Toggle,
        "clear" => Line::Clear,
        "reset" => Line::Reset,
        "stats" => Line::Stats,
        "help" | "h" | "?" => Line::Help,
        "quit" | "q" | "exit" => Line::Quit,
        other => Line::Unknown(other),
    }
}

/// Run the loop until `:quit` or end of input.
///
/// # Errors
///
/// Returns an error if reading input or writing output fails.
pub async fn run<A, R, W>(
    service: &SearchService<A>,
    options: &SearchOptions,
    format: OutputFormat,
    input: R,
    output: &mut W,
) -> Result<()>
where
    A: SourceAdapter + 'static,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    loop {
        write!(output, "> ")?;
        output.flush()?;
        let Some(line) = lines.next_line().await? else {
            writeln!(output)?;
            return Ok(());
        };

        match parse_line(&line) {
            Line::Blank => {}
            Line::Quit => return Ok(()),
            Line::Help => writeln!(output, "{HELP}")?,
            Line::Toggle => {
                let enabled = service.toggle_search_enabled();
                writeln!(
                    output,
                    "search {}",
                    if enabled { "enabled" } else { "disabled" }
                )?;
            }
            Line::Clear => {
                service.clear_cache();
                writeln!(output, "cache cleared")?;
            }
            Line::Reset => {
                service.reset_sources();
                writeln!(output, "sources reset")?;
            }
            Line::Stats => {
                let stats = service.stats().await;
                write!(output, "{}", render_stats(&stats, format)?)?;
            }
            Line::Unknown(command) => writeln!(output, "unknown command :{command}\n{HELP}")?,
            Line::Query(query) => {
                let response = service.search(query, options).await;
                writeln!(output, "{}", render_response(&response, format)?)?;
            }
        }
    }
}
