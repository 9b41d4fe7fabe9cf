//! Cache-Probe main entry point
//!
//! This is the command-line interface for the Cache-Probe crawler.

use anyhow::Context;
use cache_probe::config::{load_config, validate, Config};
use cache_probe::crawler::crawl_host;
use cache_probe::output::preview_report;
use cache_probe::payload::PayloadPool;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Cache-Probe: a same-host cache behavior crawler
///
/// Cache-Probe crawls every same-domain page and form of each host, fetches
/// every target twice, and writes the load times and caching headers to one
/// CSV report per host, ranked by first load time.
#[derive(Parser, Debug)]
#[command(name = "cache-probe")]
#[command(version = "1.0.0")]
#[command(about = "A same-host cache behavior crawler", long_about = None)]
struct Cli {
    /// Hosts to crawl (scheme optional, https is assumed)
    #[arg(value_name = "HOSTS", required = true)]
    hosts: Vec<String>,

    /// CSV file whose values are sampled to fill form fields
    #[arg(short, long, value_name = "PATH", default_value = "payloads")]
    payloads: PathBuf,

    /// Print the top rows of each sorted report
    #[arg(short, long)]
    console: bool,

    /// Path to TOML configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Override the concurrent request ceiling
    #[arg(long, value_name = "N")]
    max_concurrent_requests: Option<usize>,

    /// Override the number of rows shown by --console
    #[arg(long, value_name = "N")]
    preview_rows: Option<usize>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let (config, payloads) = match prepare(&cli) {
        Ok(prepared) => prepared,
        Err(e) => {
            tracing::error!("{:#}", e);
            return ExitCode::FAILURE;
        }
    };

    if handle_crawl(&cli, &config, payloads).await {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("cache_probe=info,warn"),
            1 => EnvFilter::new("cache_probe=debug,info"),
            2 => EnvFilter::new("cache_probe=trace,debug"),
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

/// Loads configuration, applies CLI overrides, and reads the payload pool
fn prepare(cli: &Cli) -> anyhow::Result<(Config, Arc<PayloadPool>)> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?
        }
        None => Config::default(),
    };

    if let Some(n) = cli.max_concurrent_requests {
        config.crawler.max_concurrent_requests = n;
    }
    if let Some(n) = cli.preview_rows {
        config.output.preview_rows = n;
    }
    validate(&config).context("Invalid configuration")?;

    let payloads = PayloadPool::load(&cli.payloads)?;
    tracing::info!(
        "Loaded {} payload values from {}",
        payloads.len(),
        cli.payloads.display()
    );
    if payloads.is_empty() {
        tracing::warn!("Payload pool is empty; any form with fields will fail its host");
    }

    Ok((config, Arc::new(payloads)))
}

/// Crawls every host in order; returns false if any host failed
async fn handle_crawl(cli: &Cli, config: &Config, payloads: Arc<PayloadPool>) -> bool {
    let mut all_ok = true;

    for host in &cli.hosts {
        let shutdown = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for ctrl-c: {}", e);
                std::future::pending::<()>().await;
            }
        };

        let run = match crawl_host(host, config, Arc::clone(&payloads), shutdown).await {
            Ok(run) => run,
            Err(e) => {
                tracing::error!("Crawl of {} failed: {}", host, e);
                all_ok = false;
                continue;
            }
        };

        if run.outcome.interrupted {
            tracing::warn!(
                "Interrupted; partial results kept in {}, remaining hosts skipped",
                run.report.display()
            );
            return false;
        }

        if cli.console {
            if let Err(e) = preview_report(&run.report, config.output.preview_rows) {
                tracing::error!("Failed to preview {}: {}", run.report.display(), e);
                all_ok = false;
            }
        }
    }

    all_ok
}
