//! Muni-Catalog main entry point
//!
//! This is the command-line interface for the Muni-Catalog website cataloger.

use anyhow::Context;
use clap::Parser;
use muni_catalog::config::{load_or_default, validate, validate_base_url, Config};
use muni_catalog::crawler::crawl;
use muni_catalog::output::{catalog_summary, CatalogWriter};
use muni_catalog::storage::open_storage;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Muni-Catalog: a polite municipal website cataloger
///
/// Crawls a single government website, respecting robots.txt and a
/// politeness delay, and writes a resumable catalog of its pages and the
/// PDFs they link to. Re-running with the same output directory resumes an
/// interrupted crawl.
#[derive(Parser, Debug)]
#[command(name = "muni-catalog")]
#[command(version = "1.0.0")]
#[command(about = "A polite municipal website cataloger", long_about = None)]
struct Cli {
    /// Start URL of the site to catalog (http:// or https://)
    #[arg(value_name = "BASE_URL")]
    base_url: String,

    /// Maximum link depth from the start URL
    #[arg(long, value_name = "N")]
    max_depth: Option<u32>,

    /// Seconds to wait between requests
    #[arg(long, value_name = "SECONDS")]
    delay: Option<f64>,

    /// Output directory for the catalog
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// User-Agent header sent with every request
    #[arg(long)]
    user_agent: Option<String>,

    /// Crawl language variants of pages too
    #[arg(long)]
    no_skip_languages: bool,

    /// Path to TOML configuration file
    #[arg(long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // The base URL is checked before anything touches the network
    let base_url = match validate_base_url(&cli.base_url) {
        Ok(url) => url,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let config = build_config(&cli)?;
    let output_dir = PathBuf::from(&config.output.directory);

    tracing::info!("Target: {}", base_url);
    tracing::info!("Max depth: {}", config.crawler.max_depth);
    tracing::info!("Delay: {}s", config.crawler.delay);
    tracing::info!("Output: {}", output_dir.display());

    handle_crawl(config, base_url, &output_dir).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("muni_catalog=info,warn"),
            1 => EnvFilter::new("muni_catalog=debug,info"),
            2 => EnvFilter::new("muni_catalog=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the optional config file and applies command-line overrides
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = load_or_default(cli.config.as_deref()).with_context(|| match &cli.config {
        Some(path) => format!("Failed to load configuration from {}", path.display()),
        None => "Failed to build default configuration".to_string(),
    })?;

    if let Some(max_depth) = cli.max_depth {
        config.crawler.max_depth = max_depth;
    }
    if let Some(delay) = cli.delay {
        config.crawler.delay = delay;
    }
    if let Some(output) = &cli.output {
        config.output.directory = output.display().to_string();
    }
    if let Some(user_agent) = &cli.user_agent {
        config.user_agent.user_agent = user_agent.clone();
    }
    if cli.no_skip_languages {
        config.languages.skip = false;
    }

    validate(&config).context("Invalid configuration")?;
    Ok(config)
}

/// Handles the main crawl operation, then writes the final catalog
async fn handle_crawl(config: Config, base_url: url::Url, output_dir: &Path) -> anyhow::Result<()> {
    let storage = open_storage(output_dir)
        .with_context(|| format!("Failed to open output directory {}", output_dir.display()))?;

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current request");
            on_signal.cancel();
        }
    });

    let max_depth = config.crawler.max_depth;
    let (mut storage, session, summary) = match crawl(config, base_url, storage, cancel).await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    println!();
    println!("{}", summary);
    println!();

    if summary.cancelled {
        tracing::info!("Progress saved; run again with the same output directory to resume");
        return Ok(());
    }

    let metadata = CatalogWriter::new(&mut storage, output_dir)
        .write(&session.state.base_url, max_depth, &session.pdfs, &session.graph)
        .context("Failed to write catalog")?;

    println!("{}", "=".repeat(60));
    println!("{}", catalog_summary(&metadata));
    println!("{}", "=".repeat(60));

    Ok(())
}
