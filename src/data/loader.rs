//! Source fetching: turning a configured dataset file into raw rows of cells.
//!
//! The normalization pipeline only ever sees `Vec<Vec<Cell>>`, so anything
//! that can produce row-major cells can back a session. `FileSource` is the
//! production implementation, reading Excel workbooks via calamine and CSV
//! files via the csv crate; tests substitute an in-memory source.

use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Reader};

use crate::data::values::Cell;
use crate::error::{DashResult, DashboardError};

/// Fetches the raw rows for a dataset key. The first row is expected to be
/// the header row.
pub trait SourceFetch {
    fn fetch(&self, key: &str, path: &Path) -> DashResult<Vec<Vec<Cell>>>;
}

/// File-backed source: resolves catalog paths against a data directory and
/// dispatches on the file extension.
pub struct FileSource {
    data_dir: PathBuf,
}

impl FileSource {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }
}

impl SourceFetch for FileSource {
    fn fetch(&self, key: &str, path: &Path) -> DashResult<Vec<Vec<Cell>>> {
        let full = self.data_dir.join(path);
        let ext = full
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "csv" => read_csv(key, &full),
            "xls" | "xlsx" => read_excel(key, &full),
            _ => Err(unavailable(key, format!("unsupported file format: .{ext}"))),
        }
    }
}

fn unavailable(key: &str, reason: impl Into<String>) -> DashboardError {
    DashboardError::SourceUnavailable {
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn read_excel(key: &str, path: &Path) -> DashResult<Vec<Vec<Cell>>> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| unavailable(key, format!("cannot open workbook: {e}")))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| unavailable(key, "no sheets found"))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| unavailable(key, format!("cannot read sheet: {e}")))?;

    let rows = range
        .rows()
        .map(|row| row.iter().map(cell_from_data).collect())
        .collect();
    Ok(rows)
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::DateTime(dt) => Cell::Text(dt.to_string()),
        Data::DateTimeIso(s) => Cell::Text(s.clone()),
        Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => Cell::Text(format!("{e:?}")),
    }
}

fn read_csv(key: &str, path: &Path) -> DashResult<Vec<Vec<Cell>>> {
    // Try UTF-8 first; fall back to latin1 (each byte maps to the same
    // Unicode code point), which the municipal exports occasionally use.
    let content =
        std::fs::read(path).map_err(|e| unavailable(key, format!("cannot read file: {e}")))?;
    let text = String::from_utf8(content.clone())
        .unwrap_or_else(|_| content.iter().map(|&b| b as char).collect());

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows: Vec<Vec<Cell>> = Vec::new();
    for result in reader.records() {
        match result {
            Ok(record) => rows.push(record.iter().map(Cell::from).collect()),
            Err(_) => continue,
        }
    }
    Ok(rows)
}
