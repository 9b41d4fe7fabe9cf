//! In-memory result sink

use crate::output::traits::{OutputError, OutputResult, ResultRow, ResultSink};
use std::sync::Mutex;

/// Result sink that keeps rows in memory
///
/// Useful for embedding the crawler in another program and for tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    headers_written: Mutex<usize>,
    rows: Mutex<Vec<ResultRow>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the rows appended so far, in append order
    pub fn rows(&self) -> Vec<ResultRow> {
        self.rows.lock().map(|rows| rows.clone()).unwrap_or_default()
    }

    /// Number of times the header was written
    pub fn headers_written(&self) -> usize {
        self.headers_written.lock().map(|n| *n).unwrap_or_default()
    }
}

impl ResultSink for MemorySink {
    fn write_header(&self) -> OutputResult<()> {
        let mut count = self
            .headers_written
            .lock()
            .map_err(|e| OutputError::Write(format!("Failed to lock sink: {}", e)))?;
        *count += 1;
        Ok(())
    }

    fn append(&self, row: &ResultRow) -> OutputResult<()> {
        self.rows
            .lock()
            .map_err(|e| OutputError::Write(format!("Failed to lock sink: {}", e)))?
            .push(row.clone());
        Ok(())
    }

    fn flush(&self) -> OutputResult<()> {
        Ok(())
    }
}
