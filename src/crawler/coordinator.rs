//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop for one host:
//! - Seeding the frontier with the host root
//! - Fanning probes out under the global concurrency limiter
//! - Feeding each completed probe's body to the link extractor
//! - Spawning newly admitted targets as they are discovered
//! - Stopping early on interruption
//!
//! Probes complete in arbitrary order and are handled in completion order,
//! so traversal order is a race rather than a BFS or DFS.

use crate::config::CrawlerConfig;
use crate::crawler::fetcher::{build_http_client, probe};
use crate::crawler::parser::extract;
use crate::crawler::validator::LinkValidator;
use crate::output::ResultSink;
use crate::payload::PayloadPool;
use crate::state::{CrawlPhase, Target};
use crate::CrawlError;
use reqwest::Client;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

/// Summary of one crawl run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlOutcome {
    /// Targets probed (one result row each)
    pub probes: usize,

    /// Probes that produced a body
    pub bodies: usize,

    /// True if the run was cut short by a shutdown signal
    pub interrupted: bool,
}

/// What one probe task hands back to the loop
struct ProbeReport {
    had_body: bool,
    discovered: Vec<Target>,
}

/// Main crawler coordinator structure
///
/// One coordinator crawls one host exactly once. The HTTP client, limiter,
/// validator and sink are shared with every probe task of the run.
pub struct Coordinator {
    client: Client,
    limiter: Arc<Semaphore>,
    validator: Arc<LinkValidator>,
    sink: Arc<dyn ResultSink>,
    phase: CrawlPhase,
    frontier: Vec<Target>,
}

impl Coordinator {
    /// Creates a new coordinator seeded with `GET <root>`
    ///
    /// # Arguments
    ///
    /// * `root` - Normalized host root (see [`crate::url::normalize_host`])
    /// * `config` - Crawler settings (concurrency, timeouts, skipped extensions)
    /// * `payloads` - Pool sampled for form fields
    /// * `sink` - Receives one row per probe
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(CrawlError)` - Root has no host, or the HTTP client failed to build
    pub fn new(
        root: Url,
        config: &CrawlerConfig,
        payloads: Arc<PayloadPool>,
        sink: Arc<dyn ResultSink>,
    ) -> Result<Self, CrawlError> {
        let client = build_http_client(config)?;
        Self::with_client(root, config, payloads, sink, client)
    }

    /// Same as [`Coordinator::new`] but with a caller-supplied HTTP client
    pub fn with_client(
        root: Url,
        config: &CrawlerConfig,
        payloads: Arc<PayloadPool>,
        sink: Arc<dyn ResultSink>,
        client: Client,
    ) -> Result<Self, CrawlError> {
        let validator = LinkValidator::new(root, &config.skip_extensions, payloads)?;
        let seed = validator.admit_seed()?;

        tracing::debug!(
            "Seeded crawl of {} (registrable domain {})",
            validator.root(),
            validator.root_domain()
        );

        Ok(Self {
            client,
            limiter: Arc::new(Semaphore::new(config.max_concurrent_requests)),
            validator: Arc::new(validator),
            sink,
            phase: CrawlPhase::Seeded,
            frontier: vec![seed],
        })
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    /// The validator holding this run's visited set
    pub fn validator(&self) -> &LinkValidator {
        &self.validator
    }

    /// Runs the crawl until the frontier is exhausted
    pub async fn run(&mut self) -> Result<CrawlOutcome, CrawlError> {
        self.run_until(std::future::pending()).await
    }

    /// Runs the crawl until the frontier is exhausted or `shutdown` resolves
    ///
    /// On shutdown no further probes are spawned, in-flight probes are
    /// aborted, rows already appended are flushed, and the outcome is marked
    /// interrupted. A sink failure or an empty payload pool aborts the run
    /// with an error. Calling this a second time fails with
    /// [`CrawlError::InvalidTransition`].
    pub async fn run_until<F>(&mut self, shutdown: F) -> Result<CrawlOutcome, CrawlError>
    where
        F: Future<Output = ()>,
    {
        self.transition(CrawlPhase::Draining)?;
        tracing::info!("Starting crawl of {}", self.validator.root());

        self.sink.write_header()?;

        let mut tasks = JoinSet::new();
        for target in std::mem::take(&mut self.frontier) {
            self.spawn_probe(&mut tasks, target);
        }

        let mut outcome = CrawlOutcome::default();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;

                _ = &mut shutdown => {
                    tracing::warn!(
                        "Interrupted; abandoning {} in-flight probes of {}",
                        tasks.len(),
                        self.validator.root()
                    );
                    tasks.abort_all();
                    while tasks.join_next().await.is_some() {}
                    outcome.interrupted = true;
                    break;
                }
                joined = tasks.join_next() => {
                    let Some(joined) = joined else {
                        break;
                    };

                    let report = match joined.map_err(CrawlError::from).and_then(|r| r) {
                        Ok(report) => report,
                        Err(e) => {
                            tasks.abort_all();
                            while tasks.join_next().await.is_some() {}
                            self.flush_quietly();
                            return Err(e);
                        }
                    };

                    outcome.probes += 1;
                    if report.had_body {
                        outcome.bodies += 1;
                    }
                    for target in report.discovered {
                        self.spawn_probe(&mut tasks, target);
                    }

                    if outcome.probes % 100 == 0 {
                        tracing::debug!(
                            "Progress: {} probes done, {} in flight, {} targets admitted",
                            outcome.probes,
                            tasks.len(),
                            self.validator.visited_len()
                        );
                    }
                }
            }
        }

        self.sink.flush()?;

        if !outcome.interrupted {
            self.transition(CrawlPhase::Done)?;
            tracing::info!(
                "Crawl of {} complete: {} probes, {} with a body",
                self.validator.root(),
                outcome.probes,
                outcome.bodies
            );
        }

        Ok(outcome)
    }

    fn spawn_probe(&self, tasks: &mut JoinSet<Result<ProbeReport, CrawlError>>, target: Target) {
        let client = self.client.clone();
        let limiter = Arc::clone(&self.limiter);
        let validator = Arc::clone(&self.validator);
        let sink = Arc::clone(&self.sink);

        tasks.spawn(async move {
            let outcome = probe(target, &limiter, &client, sink.as_ref()).await?;
            let discovered = match &outcome.body {
                Some(body) => extract(body, &outcome.target.url, &validator)?,
                None => Vec::new(),
            };
            Ok(ProbeReport {
                had_body: outcome.body.is_some(),
                discovered,
            })
        });
    }

    fn transition(&mut self, next: CrawlPhase) -> Result<(), CrawlError> {
        if !self.phase.can_transition_to(next) {
            return Err(CrawlError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }
        tracing::trace!("Crawl phase {} -> {}", self.phase, next);
        self.phase = next;
        Ok(())
    }

    fn flush_quietly(&self) {
        if let Err(e) = self.sink.flush() {
            tracing::warn!("Failed to flush results: {}", e);
        }
    }
}
