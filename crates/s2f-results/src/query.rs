//! Query helpers for extracting data from fetched artifacts.

use crate::types::{SweepArtifact, TimeseriesArtifact};
use crate::{ResultsError, ResultsResult};

/// Summary of a time series' extent.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeseriesSummary {
    pub row_count: usize,
    pub column_count: usize,
    pub first_label: Option<String>,
    pub last_label: Option<String>,
}

/// Basic statistics over the finite values of one column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub sum: f64,
    pub count: usize,
}

impl TimeseriesArtifact {
    pub fn summary(&self) -> TimeseriesSummary {
        TimeseriesSummary {
            row_count: self.labels().len(),
            column_count: self.columns().len(),
            first_label: self.labels().first().cloned(),
            last_label: self.labels().last().cloned(),
        }
    }

    pub fn column_index(&self, name: &str) -> ResultsResult<usize> {
        self.columns()
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| ResultsError::UnknownColumn(name.to_string()))
    }

    /// All values of one column, in row order.
    pub fn column(&self, name: &str) -> ResultsResult<Vec<f64>> {
        let idx = self.column_index(name)?;
        Ok(self.values().iter().map(|row| row[idx]).collect())
    }

    /// `(label, value)` pairs for one column.
    pub fn series(&self, name: &str) -> ResultsResult<Vec<(&str, f64)>> {
        let idx = self.column_index(name)?;
        Ok(self
            .labels()
            .iter()
            .zip(self.values())
            .map(|(label, row)| (label.as_str(), row[idx]))
            .collect())
    }

    /// `None` when the column has no finite values.
    pub fn column_stats(&self, name: &str) -> ResultsResult<Option<ColumnStats>> {
        let values = self.column(name)?;
        let finite: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
        if finite.is_empty() {
            return Ok(None);
        }

        let sum: f64 = finite.iter().sum();
        let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
        let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Ok(Some(ColumnStats {
            min,
            max,
            mean: sum / finite.len() as f64,
            sum,
            count: finite.len(),
        }))
    }
}

impl SweepArtifact {
    /// Columns other than the two axis fields, in service order.
    pub fn metric_names(&self, x_field: &str, y_field: &str) -> Vec<&str> {
        self.columns
            .iter()
            .map(String::as_str)
            .filter(|c| *c != x_field && *c != y_field)
            .collect()
    }
}
