//! Sweep pivot: sparse labeled rows to dense heatmap matrices.
//!
//! Rows are placed on a grid whose column axis is the sorted distinct values
//! of the `x` field and whose row axis is the sorted distinct values of the
//! `y` field. Grid cells with no matching row, and matching rows without the
//! requested metric, read as zero.

use crate::types::{SweepArtifact, SweepRow};

/// PV array size sweep column (kWdc).
pub const PV_KW: &str = "pv_kw";
/// Battery capacity sweep column (kWh).
pub const BATT_KWH: &str = "batt_kwh";

/// Sorted distinct axis values found in a row set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PivotAxes {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

/// Dense metric matrix: `values[i][j]` belongs to `y[i]`, `x[j]`.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotMatrix {
    pub metric: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub values: Vec<Vec<f64>>,
}

/// Pivot over a pair of independent-variable fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepPivot {
    x_field: String,
    y_field: String,
}

impl Default for SweepPivot {
    /// PV size across, battery size down.
    fn default() -> Self {
        Self::new(PV_KW, BATT_KWH)
    }
}

impl SweepPivot {
    pub fn new(x_field: impl Into<String>, y_field: impl Into<String>) -> Self {
        Self {
            x_field: x_field.into(),
            y_field: y_field.into(),
        }
    }

    pub fn x_field(&self) -> &str {
        &self.x_field
    }

    pub fn y_field(&self) -> &str {
        &self.y_field
    }

    pub fn axes(&self, rows: &[SweepRow]) -> PivotAxes {
        PivotAxes {
            x: distinct_sorted(rows.iter().filter_map(|r| axis_value(r, &self.x_field))),
            y: distinct_sorted(rows.iter().filter_map(|r| axis_value(r, &self.y_field))),
        }
    }

    pub fn matrix(&self, rows: &[SweepRow], metric: &str) -> PivotMatrix {
        let axes = self.axes(rows);
        let grid = self.locate(rows, &axes);
        build_matrix(rows, &axes, &grid, metric)
    }

    /// One matrix per metric, sharing a single axis extraction.
    pub fn matrices(&self, rows: &[SweepRow], metrics: &[&str]) -> Vec<PivotMatrix> {
        let axes = self.axes(rows);
        let grid = self.locate(rows, &axes);
        metrics
            .iter()
            .map(|metric| build_matrix(rows, &axes, &grid, metric))
            .collect()
    }

    pub fn pivot_artifact(&self, sweep: &SweepArtifact, metrics: &[&str]) -> Vec<PivotMatrix> {
        self.matrices(&sweep.rows, metrics)
    }

    /// For every grid cell, the index of the first row landing on it.
    fn locate(&self, rows: &[SweepRow], axes: &PivotAxes) -> Vec<Vec<Option<usize>>> {
        let mut grid = vec![vec![None; axes.x.len()]; axes.y.len()];
        for (idx, row) in rows.iter().enumerate() {
            let (Some(x), Some(y)) = (
                axis_value(row, &self.x_field),
                axis_value(row, &self.y_field),
            ) else {
                continue;
            };
            let (Ok(j), Ok(i)) = (position(&axes.x, x), position(&axes.y, y)) else {
                continue;
            };
            let cell = &mut grid[i][j];
            if cell.is_none() {
                *cell = Some(idx);
            }
        }
        grid
    }
}

fn build_matrix(
    rows: &[SweepRow],
    axes: &PivotAxes,
    grid: &[Vec<Option<usize>>],
    metric: &str,
) -> PivotMatrix {
    let values = grid
        .iter()
        .map(|line| {
            line.iter()
                .map(|cell| {
                    cell.and_then(|idx| rows[idx].get(metric))
                        .unwrap_or(0.0)
                })
                .collect()
        })
        .collect();

    PivotMatrix {
        metric: metric.to_string(),
        x: axes.x.clone(),
        y: axes.y.clone(),
        values,
    }
}

/// Finite axis value with `-0.0` folded onto `0.0`.
fn axis_value(row: &SweepRow, field: &str) -> Option<f64> {
    row.get(field).filter(|v| v.is_finite()).map(|v| v + 0.0)
}

fn distinct_sorted(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut out: Vec<f64> = values.collect();
    out.sort_by(f64::total_cmp);
    out.dedup();
    out
}

fn position(axis: &[f64], value: f64) -> Result<usize, usize> {
    axis.binary_search_by(|probe| probe.total_cmp(&value))
}

impl PivotMatrix {
    pub fn rows(&self) -> usize {
        self.y.len()
    }

    pub fn cols(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Cell lookup by axis values rather than indices.
    pub fn value_at(&self, x: f64, y: f64) -> Option<f64> {
        let j = position(&self.x, x + 0.0).ok()?;
        let i = position(&self.y, y + 0.0).ok()?;
        Some(self.values[i][j])
    }

    /// Multiply every cell by `factor` (unit conversion for display).
    pub fn scaled(self, factor: f64) -> Self {
        self.map(|v| v * factor)
    }

    pub fn map(mut self, f: impl Fn(f64) -> f64) -> Self {
        for line in &mut self.values {
            for v in line.iter_mut() {
                *v = f(*v);
            }
        }
        self
    }

    /// `(x, y, value)` of the largest cell; first in row-major order on ties.
    pub fn max_cell(&self) -> Option<(f64, f64, f64)> {
        let mut best: Option<(f64, f64, f64)> = None;
        for (i, line) in self.values.iter().enumerate() {
            for (j, &v) in line.iter().enumerate() {
                if best.is_none_or(|(_, _, b)| v > b) {
                    best = Some((self.x[j], self.y[i], v));
                }
            }
        }
        best
    }

    /// Smallest and largest cell, for color scaling.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.values
            .iter()
            .flatten()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}
