//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the shared HTTP client (no redirects, connect/read timeouts)
//! - The double-fetch cache probe for one target
//! - Error classification for log output
//!
//! # Probe Flow
//!
//! 1. Acquire one slot of the global concurrency limiter
//! 2. First request → `first_load`
//! 3. Second request → `second_load`, cache headers
//! 4. Release the slot and append the target's row to the result sink
//!
//! A failure in either request is logged and turns the probe into a
//! "no body" outcome; whatever was measured before the failure is kept.

use crate::config::CrawlerConfig;
use crate::output::{OutputError, ResultRow, ResultSink};
use crate::state::{Method, Target};
use reqwest::header::{HeaderMap, HeaderName, CACHE_CONTROL, ETAG, EXPIRES, LAST_MODIFIED};
use reqwest::{redirect::Policy, Client, RequestBuilder, StatusCode};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Semaphore;

/// Why a probe request failed
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("unexpected status {0}")]
    Status(StatusCode),

    #[error("concurrency limiter closed")]
    LimiterClosed,

    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::Connect(e.to_string())
        } else {
            Self::Other(e.to_string())
        }
    }
}

/// Result of probing one target
#[derive(Debug)]
pub struct ProbeOutcome {
    /// The target with its measurements filled in
    pub target: Target,

    /// Body of the second response, or `None` if either request failed
    pub body: Option<Vec<u8>>,
}

/// Builds the HTTP client shared by every probe of a run
///
/// Redirects are never followed: the probe measures the exact target, not
/// whatever it redirects to. Connect and read timeouts apply per request;
/// there is no total-request ceiling.
///
/// # Example
///
/// ```no_run
/// use cache_probe::config::CrawlerConfig;
/// use cache_probe::crawler::build_http_client;
///
/// let client = build_http_client(&CrawlerConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &CrawlerConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .connect_timeout(config.connect_timeout())
        .read_timeout(config.read_timeout())
        .redirect(Policy::none())
        .build()
}

/// Runs the double-fetch probe for one target
///
/// Network failures never escape: they are logged and reported as a `None`
/// body. The target's row is always appended to `sink`, even when both
/// requests failed. Only a sink write failure is returned as an error.
///
/// # Arguments
///
/// * `target` - The target to probe
/// * `limiter` - Global concurrency limiter; one permit is held for both requests
/// * `client` - Shared HTTP client
/// * `sink` - Receives the target's measurement row
pub async fn probe(
    mut target: Target,
    limiter: &Semaphore,
    client: &Client,
    sink: &dyn ResultSink,
) -> Result<ProbeOutcome, OutputError> {
    let body = match limiter.acquire().await {
        Ok(_permit) => {
            tracing::info!("{} - {}", target.method, target.url);
            match double_fetch(&mut target, client).await {
                Ok(body) => Some(body),
                Err(e) => {
                    tracing::warn!("Probe of {} {} failed: {}", target.method, target.url, e);
                    None
                }
            }
        }
        Err(_) => {
            tracing::warn!(
                "Probe of {} {} skipped: {}",
                target.method,
                target.url,
                FetchError::LimiterClosed
            );
            None
        }
    };

    sink.append(&ResultRow::from(&target))?;

    Ok(ProbeOutcome { target, body })
}

/// Issues both requests, filling in measurements as they succeed
async fn double_fetch(target: &mut Target, client: &Client) -> Result<Vec<u8>, FetchError> {
    let first = timed_request(client, target).await?;
    target.first_load = first.elapsed;

    let second = timed_request(client, target).await?;
    target.second_load = second.elapsed;
    target.cache_control = header_value(&second.headers, CACHE_CONTROL);
    target.expires = header_value(&second.headers, EXPIRES);
    target.etag = header_value(&second.headers, ETAG);
    target.last_modified = header_value(&second.headers, LAST_MODIFIED);

    Ok(second.body)
}

struct TimedResponse {
    elapsed: Duration,
    headers: HeaderMap,
    body: Vec<u8>,
}

/// Sends one request and reads the full body, timing both
async fn timed_request(client: &Client, target: &Target) -> Result<TimedResponse, FetchError> {
    let start = Instant::now();

    let response = build_request(client, target).send().await?;
    // Redirects are measured as-is; only 4xx and 5xx count as failures
    let status = response.status();
    if status.is_client_error() || status.is_server_error() {
        return Err(FetchError::Status(status));
    }

    let headers = response.headers().clone();
    let body = response.bytes().await?;

    Ok(TimedResponse {
        elapsed: start.elapsed(),
        headers,
        body: body.to_vec(),
    })
}

/// GET sends the payload as query parameters, POST as a urlencoded form body
fn build_request(client: &Client, target: &Target) -> RequestBuilder {
    match target.method {
        Method::Get if target.payload.is_empty() => client.get(target.url.clone()),
        Method::Get => client.get(target.url.clone()).query(&target.payload),
        Method::Post => client.post(target.url.clone()).form(&target.payload),
    }
}

fn header_value(headers: &HeaderMap, name: HeaderName) -> Option<String> {
    headers
        .get(name)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
}
