//! Console preview of a sorted report

use crate::output::traits::OutputResult;
use std::path::Path;

/// Columns shown by the preview (URL, first load, second load)
const PREVIEW_COLUMNS: std::ops::Range<usize> = 1..4;

/// The top rows of a report, ready for display
#[derive(Debug, Clone, PartialEq)]
pub struct ReportPreview {
    /// Column titles
    pub header: Vec<String>,

    /// Shown rows, in report order
    pub rows: Vec<Vec<String>>,

    /// Whether the report holds more rows than were shown
    pub truncated: bool,
}

/// Loads the first `limit` data rows of a report
pub fn load_preview(path: &Path, limit: usize) -> OutputResult<ReportPreview> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut header = Vec::new();
    let mut rows = Vec::new();
    let mut total = 0usize;

    for (index, record) in reader.records().enumerate() {
        let record = record?;
        let cells = PREVIEW_COLUMNS
            .map(|i| record.get(i).unwrap_or_default().to_string())
            .collect::<Vec<_>>();

        if index == 0 {
            header = cells;
            continue;
        }

        total += 1;
        if rows.len() < limit {
            rows.push(cells);
        }
    }

    Ok(ReportPreview {
        header,
        rows,
        truncated: total > limit,
    })
}

/// Prints a preview as an aligned table
pub fn print_preview(preview: &ReportPreview) {
    let title = |i: usize| preview.header.get(i).map(String::as_str).unwrap_or("");

    println!("{:<70} {:<20} {:<20}", title(0), title(1), title(2));
    println!("{}", "=".repeat(112));

    for row in &preview.rows {
        let url = &row[0];
        let url_display = if url.chars().count() > 67 {
            format!("{}...", url.chars().take(67).collect::<String>())
        } else {
            url.clone()
        };
        println!("{:<70} {:<20} {:<20}", url_display, row[1], row[2]);
    }

    if preview.truncated {
        println!("Too many rows to show");
    }
}

/// Loads and prints the top `limit` rows of a report
pub fn preview_report(path: &Path, limit: usize) -> OutputResult<()> {
    let preview = load_preview(path, limit)?;
    print_preview(&preview);
    Ok(())
}
