use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Default ceiling on simultaneous in-flight HTTP requests
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 50;

/// Default per-request connect timeout (seconds)
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 40;

/// Default per-request read timeout (seconds)
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 40;

/// Main configuration structure for Cache-Probe
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum number of HTTP requests in flight for one crawl run
    #[serde(rename = "max-concurrent-requests")]
    pub max_concurrent_requests: usize,

    /// Connect timeout applied to every request (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    /// Read timeout applied to every request (seconds)
    #[serde(rename = "read-timeout-secs")]
    pub read_timeout_secs: u64,

    /// Path suffixes that are never admitted to the frontier
    #[serde(rename = "skip-extensions")]
    pub skip_extensions: Vec<String>,
}

impl CrawlerConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            read_timeout_secs: DEFAULT_READ_TIMEOUT_SECS,
            skip_extensions: [
                ".jpg", ".jpeg", ".png", ".gif", ".bmp", ".svg", ".ico", ".webp", ".pdf",
                ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx",
            ]
            .iter()
            .map(|ext| ext.to_string())
            .collect(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory that receives one CSV report per host
    #[serde(rename = "reports-dir")]
    pub reports_dir: PathBuf,

    /// Number of rows shown by the console preview
    #[serde(rename = "preview-rows")]
    pub preview_rows: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            reports_dir: PathBuf::from("reports"),
            preview_rows: 50,
        }
    }
}
