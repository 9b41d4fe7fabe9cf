//! Result sink trait and report row types
//!
//! This module defines the trait interface for result sinks and the row
//! written for every probed target.

use crate::state::Target;
use thiserror::Error;

/// Column names of a report, in order
pub const REPORT_HEADER: [&str; 8] = [
    "Method",
    "URL",
    "First Time Load",
    "Second Time Load",
    "Cache-control",
    "Expires",
    "ETag",
    "Last-Modified",
];

/// Index of the first-load column, the ranking key of a report
pub const FIRST_LOAD_COLUMN: usize = 2;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// One measurement row of a report
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub method: String,
    pub url: String,

    /// First fetch duration in seconds
    pub first_load: f64,

    /// Second fetch duration in seconds
    pub second_load: f64,

    pub cache_control: String,
    pub expires: String,
    pub etag: String,
    pub last_modified: String,
}

impl ResultRow {
    /// Renders the row as report fields
    ///
    /// Control characters are replaced with spaces so that every record stays
    /// on a single line.
    pub fn to_record(&self) -> [String; 8] {
        [
            sanitize_field(&self.method),
            sanitize_field(&self.url),
            self.first_load.to_string(),
            self.second_load.to_string(),
            sanitize_field(&self.cache_control),
            sanitize_field(&self.expires),
            sanitize_field(&self.etag),
            sanitize_field(&self.last_modified),
        ]
    }
}

impl From<&Target> for ResultRow {
    fn from(target: &Target) -> Self {
        Self {
            method: target.method.as_str().to_string(),
            url: target.url.as_str().to_string(),
            first_load: target.first_load.as_secs_f64(),
            second_load: target.second_load.as_secs_f64(),
            cache_control: target.cache_control.clone().unwrap_or_default(),
            expires: target.expires.clone().unwrap_or_default(),
            etag: target.etag.clone().unwrap_or_default(),
            last_modified: target.last_modified.clone().unwrap_or_default(),
        }
    }
}

/// Replaces control characters (CR, LF, tabs, ...) with a space
pub fn sanitize_field(value: &str) -> String {
    value
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}

/// Trait for result sinks
///
/// A sink is an append-only row writer shared by every in-flight probe of a
/// crawl run, so implementations must be thread-safe.
pub trait ResultSink: Send + Sync {
    /// Writes the header row; called once when the run starts
    fn write_header(&self) -> OutputResult<()>;

    /// Appends the measurement row of one probed target
    ///
    /// # Arguments
    ///
    /// * `row` - The row to append
    fn append(&self, row: &ResultRow) -> OutputResult<()>;

    /// Flushes buffered rows to durable storage
    fn flush(&self) -> OutputResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Method;
    use std::time::Duration;
    use url::Url;

    #[test]
    fn test_row_from_unmeasured_target() {
        let target = Target::new(Url::parse("https://example.test/a").unwrap(), Method::Get);
        let row = ResultRow::from(&target);

        assert_eq!(row.method, "get");
        assert_eq!(row.url, "https://example.test/a");
        assert_eq!(row.first_load, 0.0);
        assert_eq!(row.second_load, 0.0);
        assert!(row.cache_control.is_empty());
        assert!(row.last_modified.is_empty());
    }

    #[test]
    fn test_row_from_measured_target() {
        let mut target =
            Target::new(Url::parse("https://example.test/submit").unwrap(), Method::Post);
        target.first_load = Duration::from_millis(1500);
        target.second_load = Duration::from_millis(250);
        target.cache_control = Some("max-age=60".to_string());
        target.etag = Some("\"abc\"".to_string());

        let record = ResultRow::from(&target).to_record();
        assert_eq!(record[0], "post");
        assert_eq!(record[2], "1.5");
        assert_eq!(record[3], "0.25");
        assert_eq!(record[4], "max-age=60");
        assert_eq!(record[5], "");
        assert_eq!(record[6], "\"abc\"");
    }

    #[test]
    fn test_sanitize_field() {
        assert_eq!(sanitize_field("no-cache\r\nX-Evil: 1"), "no-cache  X-Evil: 1");
        assert_eq!(sanitize_field("a\tb"), "a b");
        assert_eq!(sanitize_field("plain"), "plain");
    }

    #[test]
    fn test_header_layout() {
        assert_eq!(REPORT_HEADER.len(), 8);
        assert_eq!(REPORT_HEADER[FIRST_LOAD_COLUMN], "First Time Load");
    }
}
