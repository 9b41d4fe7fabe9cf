//! Crawler module for cache probing
//!
//! This module contains the core crawling logic, including:
//! - Candidate validation against the visited set and host rules
//! - HTML parsing and link/form extraction
//! - The double-fetch probe
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod parser;
mod validator;

pub use coordinator::{Coordinator, CrawlOutcome};
pub use fetcher::{build_http_client, probe, FetchError, ProbeOutcome};
pub use parser::{extract, extract_candidates};
pub use validator::{Candidate, LinkValidator, Rejection, Verdict};

use crate::config::Config;
use crate::output::{report_path, sort_report, CsvSink};
use crate::payload::PayloadPool;
use crate::url::{normalize_host, report_label};
use crate::CrawlError;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

/// Result of crawling one host end to end
#[derive(Debug, Clone)]
pub struct HostRun {
    /// The CSV report written for the host
    pub report: PathBuf,

    /// Counters from the crawl loop
    pub outcome: CrawlOutcome,
}

/// Crawls one host and writes its sorted report
///
/// This is the main entry point for a single host. It will:
/// 1. Normalize the host into a root URL
/// 2. Create `<reports-dir>/<label>.csv`
/// 3. Crawl until the frontier is empty or `shutdown` resolves
/// 4. Sort the report by first load time, unless interrupted
///
/// # Arguments
///
/// * `host` - Host as given on the command line, with or without a scheme
/// * `config` - Crawler and output settings
/// * `payloads` - Pool sampled for form fields
/// * `shutdown` - Resolves when the crawl should stop early
pub async fn crawl_host<F>(
    host: &str,
    config: &Config,
    payloads: Arc<PayloadPool>,
    shutdown: F,
) -> Result<HostRun, CrawlError>
where
    F: Future<Output = ()>,
{
    let root = normalize_host(host)?;
    let report = report_path(&config.output.reports_dir, &report_label(&root));
    tracing::info!("Writing results for {} to {}", root, report.display());

    let sink = Arc::new(CsvSink::create(&report)?);
    let mut coordinator = Coordinator::new(root, &config.crawler, payloads, sink)?;
    let outcome = coordinator.run_until(shutdown).await?;

    if outcome.interrupted {
        tracing::warn!("Skipping sort of partial report {}", report.display());
    } else {
        let rows = sort_report(&report)?;
        tracing::debug!("Sorted {} rows in {}", rows, report.display());
    }

    Ok(HostRun { report, outcome })
}
