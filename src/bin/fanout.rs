//! CLI binary for fanout.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use fanout::output::{render_response, render_sources};
use fanout::{AppConfig, OutputFormat};
use fanout_search::{SearchOptions, SearchService};
use tracing_subscriber::EnvFilter;

/// Fanout: query many search sources at once and print one ranked digest.
#[derive(Parser)]
#[command(name = "fanout", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format, overriding the config file.
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Command,
}

/// Available commands.
#[derive(Subcommand)]
enum Command {
    /// Run one search and print the result.
    Search {
        /// Query text.
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        /// Maximum number of items.
        #[arg(short = 'n', long, default_value_t = 10)]
        max_results: usize,

        /// Overall deadline in milliseconds.
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Skip the enrichment pass.
        #[arg(long)]
        no_details: bool,
    },

    /// List the registered sources and their health.
    Sources,

    /// Interactive search session.
    Repl {
        /// Maximum number of items per query.
        #[arg(short = 'n', long, default_value_t = 10)]
        max_results: usize,
    },

    /// Write the default configuration file.
    InitConfig {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the digest; logs go to stderr.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("fanout=info,fanout_search=info")),
        )
        .init();

    let cli = Cli::parse();

    if let Command::InitConfig { force } = cli.command {
        return init_config(cli.config, force);
    }

    let config = AppConfig::load(cli.config.as_deref()).context("loading configuration")?;
    let format = cli.format.unwrap_or(config.output.format);
    let service = SearchService::new(config.search).context("starting search service")?;

    match cli.command {
        Command::Search {
            query,
            max_results,
            timeout_ms,
            no_details,
        } => {
            let options = SearchOptions {
                max_results,
                include_detailed: !no_details,
                timeout: timeout_ms.map(Duration::from_millis),
                ..Default::default()
            };
            let response = service.search(&query.join(" "), &options).await;
            println!("{}", render_response(&response, format)?);
        }
        Command::Sources => {
            let stats = service.stats().await;
            if format == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&stats.sources)?);
            } else {
                print!("{}", render_sources(&stats.sources));
            }
        }
        Command::Repl { max_results } => {
            let options = SearchOptions {
                max_results,
                ..Default::default()
            };
            println!("fanout v{} (:help for commands)", env!("CARGO_PKG_VERSION"));
            let input = tokio::io::BufReader::new(tokio::io::stdin());
            let mut output = std::io::stdout();
            fanout::repl::run(&service, &options, format, input, &mut output).await?;
        }
        Command::InitConfig { .. } => {}
    }

    Ok(())
}

fn init_config(path: Option<PathBuf>, force: bool) -> anyhow::Result<()> {
    let path = path.unwrap_or_else(fanout::default_config_path);
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }
    AppConfig::default().save_to_file(&path)?;
    tracing::info!(path = %path.display(), "wrote default configuration");
    println!("{}", path.display());
    Ok(())
}
