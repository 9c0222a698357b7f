//! s2f-results: run artifacts and the sweep pivot.

pub mod pivot;
pub mod query;
pub mod types;

pub use pivot::{BATT_KWH, PV_KW, PivotAxes, PivotMatrix, SweepPivot};
pub use query::{ColumnStats, TimeseriesSummary};
pub use types::*;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ResultsError {
    #[error("Row {row} has {found} values, expected {expected} (one per column)")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Timeseries has {labels} labels but {rows} data rows")]
    RowCount { labels: usize, rows: usize },

    #[error("Unknown column: {0}")]
    UnknownColumn(String),
}
