use thiserror::Error;

use crate::data::datetime::MonthDate;

pub type DashResult<T> = Result<T, DashboardError>;

/// Recoverable dashboard errors. Each variant maps to one user-facing
/// message; none of them is fatal to the session, and a failed operation
/// leaves the dataset cache untouched.
///
/// Header-date and cell-value parse failures are deliberately *not* errors:
/// source spreadsheets mix formats within one file, so malformed columns and
/// cells are skipped silently during normalization.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("could not fetch source for '{key}': {reason}")]
    SourceUnavailable { key: String, reason: String },

    #[error("source for '{0}' is empty or has no header row")]
    EmptySource(String),

    #[error("no source configured for dataset key '{0}'")]
    UnconfiguredKey(String),

    #[error("municipality '{0}' not found in the selected dataset(s)")]
    EntityNotFound(String),

    #[error("start date {start} must not be after end date {end}")]
    InvalidRange { start: MonthDate, end: MonthDate },

    #[error("no data points available for the selected period")]
    NoDataInRange,

    #[error("catalog error: {0}")]
    Catalog(String),
}
