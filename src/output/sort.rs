//! Report ranking
//!
//! After a crawl finishes, its report is rewritten with data rows ordered by
//! first load time, slowest first.

use crate::output::csv_output::report_writer;
use crate::output::traits::{OutputResult, FIRST_LOAD_COLUMN, REPORT_HEADER};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};

/// Sorts a report by first load time, descending
///
/// The header row is kept first. Rows whose first-load cell is missing or not
/// a number sort after every numeric row; rows with equal keys keep their
/// original order. The sorted report is written to a sibling file and renamed
/// over the original, so an interrupted sort leaves the old file intact.
///
/// # Arguments
///
/// * `path` - Path to the report file
///
/// # Returns
///
/// * `Ok(usize)` - Number of data rows in the sorted report
/// * `Err(OutputError)` - Failed to read or rewrite the report
pub fn sort_report(path: &Path) -> OutputResult<usize> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut records = reader
        .records()
        .collect::<Result<Vec<csv::StringRecord>, csv::Error>>()?;

    let header = if records.is_empty() {
        csv::StringRecord::from(REPORT_HEADER.to_vec())
    } else {
        records.remove(0)
    };

    records.sort_by(|a, b| compare_first_load(first_load(a), first_load(b)));

    let staging = staging_path(path);
    {
        let mut writer = report_writer(std::fs::File::create(&staging)?);
        writer.write_record(&header)?;
        for record in &records {
            writer.write_record(record)?;
        }
        writer.flush()?;
    }
    std::fs::rename(&staging, path)?;

    tracing::debug!("Sorted {} rows in {}", records.len(), path.display());
    Ok(records.len())
}

/// Parses the ranking key of a row
fn first_load(record: &csv::StringRecord) -> Option<f64> {
    record
        .get(FIRST_LOAD_COLUMN)
        .and_then(|cell| cell.trim().parse::<f64>().ok())
        .filter(|value| !value.is_nan())
}

/// Descending order with unparsable keys last
fn compare_first_load(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".sorting");
    path.with_file_name(name)
}
