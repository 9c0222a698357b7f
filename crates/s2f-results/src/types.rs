//! Result artifact types.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use s2f_core::numeric::{NumericMap, deserialize_numeric_map};

use crate::{ResultsError, ResultsResult};

/// Column-oriented time series for one finished run.
///
/// `values` is row-major with exactly one row per label and one value per
/// column; the constructor and the decoder both enforce this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTimeseries")]
pub struct TimeseriesArtifact {
    #[serde(rename = "index")]
    labels: Vec<String>,
    columns: Vec<String>,
    #[serde(rename = "data")]
    values: Vec<Vec<f64>>,
}

/// Wire form: cells may be `null` where the service wrote a NaN.
#[derive(Deserialize)]
struct RawTimeseries {
    index: Vec<String>,
    columns: Vec<String>,
    data: Vec<Vec<Option<f64>>>,
}

impl TryFrom<RawTimeseries> for TimeseriesArtifact {
    type Error = ResultsError;

    fn try_from(raw: RawTimeseries) -> ResultsResult<Self> {
        let values = raw
            .data
            .into_iter()
            .map(|row| row.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
            .collect();
        Self::new(raw.index, raw.columns, values)
    }
}

impl TimeseriesArtifact {
    pub fn new(
        labels: Vec<String>,
        columns: Vec<String>,
        values: Vec<Vec<f64>>,
    ) -> ResultsResult<Self> {
        if labels.len() != values.len() {
            return Err(ResultsError::RowCount {
                labels: labels.len(),
                rows: values.len(),
            });
        }
        if let Some((row, found)) = values
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|(_, len)| *len != columns.len())
        {
            return Err(ResultsError::RowWidth {
                row,
                expected: columns.len(),
                found,
            });
        }

        Ok(Self {
            labels,
            columns,
            values,
        })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Vec<f64>] {
        &self.values
    }

    /// `(rows, columns)`
    pub fn shape(&self) -> (usize, usize) {
        (self.labels.len(), self.columns.len())
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// One sweep combination: axis values plus the metrics computed for it.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct SweepRow(NumericMap);

impl<'de> Deserialize<'de> for SweepRow {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserialize_numeric_map(deserializer).map(SweepRow)
    }
}

impl SweepRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: impl Into<String>, value: f64) -> Self {
        self.0.insert(field.into(), value);
        self
    }

    pub fn get(&self, field: &str) -> Option<f64> {
        self.0.get(field).copied()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for SweepRow {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        SweepRow(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl From<BTreeMap<String, f64>> for SweepRow {
    fn from(map: BTreeMap<String, f64>) -> Self {
        SweepRow(map)
    }
}

/// Sparse, unordered list of sweep combination results.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SweepArtifact {
    pub columns: Vec<String>,
    #[serde(rename = "data")]
    pub rows: Vec<SweepRow>,
}

impl SweepArtifact {
    pub fn new(columns: Vec<String>, rows: Vec<SweepRow>) -> Self {
        Self { columns, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
