//! CSV report sink
//!
//! Rows are appended to one comma-delimited file per host, one record per
//! line. Every append is flushed so rows computed before an interruption are
//! already on disk.

use crate::output::traits::{OutputError, OutputResult, ResultRow, ResultSink, REPORT_HEADER};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Result sink writing a CSV report file
pub struct CsvSink {
    path: PathBuf,
    writer: Mutex<csv::Writer<File>>,
}

impl CsvSink {
    /// Creates (or truncates) the report file at `path`
    ///
    /// Missing parent directories are created.
    pub fn create(path: &Path) -> OutputResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = File::create(path)?;
        let writer = report_writer(file);

        Ok(Self {
            path: path.to_path_buf(),
            writer: Mutex::new(writer),
        })
    }

    /// Path of the report file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_record<I, T>(&self, record: I) -> OutputResult<()>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        let mut writer = self
            .writer
            .lock()
            .map_err(|e| OutputError::Write(format!("Failed to lock report writer: {}", e)))?;
        writer.write_record(record)?;
        writer.flush()?;
        Ok(())
    }
}

/// Builds a CSV writer with the report dialect (comma, `\n` terminator)
///
/// Records of differing lengths are accepted so that hand-edited reports can
/// still be rewritten by the sort pass.
pub(crate) fn report_writer<W: std::io::Write>(inner: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(inner)
}

impl ResultSink for CsvSink {
    fn write_header(&self) -> OutputResult<()> {
        self.write_record(REPORT_HEADER)
    }

    fn append(&self, row: &ResultRow) -> OutputResult<()> {
        self.write_record(row.to_record())
    }

    fn flush(&self) -> OutputResult<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|e| OutputError::Write(format!("Failed to lock report writer: {}", e)))?;
        writer.flush()?;
        Ok(())
    }
}
