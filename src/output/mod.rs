//! Output module for crawl results
//!
//! This module handles:
//! - The result sink interface every probe writes its row to
//! - CSV report files (one per host) and an in-memory sink
//! - Ranking a finished report by first load time
//! - Previewing the top rows of a report on the console

mod csv_output;
mod memory;
mod preview;
mod sort;
mod traits;

pub use csv_output::CsvSink;
pub use memory::MemorySink;
pub use preview::{load_preview, preview_report, print_preview, ReportPreview};
pub use sort::sort_report;
pub use traits::{
    sanitize_field, OutputError, OutputResult, ResultRow, ResultSink, FIRST_LOAD_COLUMN,
    REPORT_HEADER,
};

use std::path::{Path, PathBuf};

/// Path of a host's report inside the reports directory
pub fn report_path(reports_dir: &Path, label: &str) -> PathBuf {
    reports_dir.join(format!("{}.csv", label))
}
