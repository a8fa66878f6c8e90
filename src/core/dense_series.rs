use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::primitives::BUCKET;
use crate::core::{ColumnKey, TimeRange};
use crate::error::{TimelineError, TimelineResult};

/// One grid bucket; `values[i]` belongs to `DenseSeries::columns()[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DensePoint {
    pub time: DateTime<Utc>,
    pub values: Vec<f64>,
}

/// Row shape consumed by charting layers: time plus one value per column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartRow {
    pub time: DateTime<Utc>,
    pub values: IndexMap<ColumnKey, f64>,
}

/// Gap-free, minute-aligned metric grid.
///
/// Consecutive points are exactly one bucket apart and every point carries a
/// value for every column. The series is never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseSeries {
    columns: Vec<ColumnKey>,
    points: Vec<DensePoint>,
}

impl DenseSeries {
    /// Builds a series from pre-gridded points, checking the grid invariants.
    pub fn from_points(columns: Vec<ColumnKey>, points: Vec<DensePoint>) -> TimelineResult<Self> {
        if points.is_empty() {
            return Err(TimelineError::InvalidData(
                "dense series requires at least one point".to_owned(),
            ));
        }
        for (index, point) in points.iter().enumerate() {
            if point.values.len() != columns.len() {
                return Err(TimelineError::InvalidData(format!(
                    "dense point {index} has {} values for {} columns",
                    point.values.len(),
                    columns.len()
                )));
            }
            if index > 0 && point.time - points[index - 1].time != BUCKET {
                return Err(TimelineError::InvalidData(format!(
                    "dense point {index} is not one bucket after its predecessor"
                )));
            }
        }
        Ok(Self { columns, points })
    }

    pub(crate) fn from_grid_unchecked(columns: Vec<ColumnKey>, points: Vec<DensePoint>) -> Self {
        debug_assert!(!points.is_empty());
        Self { columns, points }
    }

    #[must_use]
    pub fn columns(&self) -> &[ColumnKey] {
        &self.columns
    }

    #[must_use]
    pub fn points(&self) -> &[DensePoint] {
        &self.points
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub fn start(&self) -> DateTime<Utc> {
        self.points[0].time
    }

    #[must_use]
    pub fn end(&self) -> DateTime<Utc> {
        self.points[self.points.len() - 1].time
    }

    #[must_use]
    pub fn bounds(&self) -> TimeRange {
        TimeRange::from_ordered(self.start(), self.end())
    }

    #[must_use]
    pub fn time_at(&self, index: usize) -> Option<DateTime<Utc>> {
        self.points.get(index).map(|point| point.time)
    }

    #[must_use]
    pub fn value(&self, index: usize, column: &str) -> Option<f64> {
        let column_index = self.columns.iter().position(|c| c == column)?;
        self.points
            .get(index)
            .map(|point| point.values[column_index])
    }

    /// Index of the first point at or after `time`.
    #[must_use]
    pub fn index_at_or_after(&self, time: DateTime<Utc>) -> Option<usize> {
        let index = self.points.partition_point(|point| point.time < time);
        (index < self.points.len()).then_some(index)
    }

    #[must_use]
    pub fn rows(&self) -> Vec<ChartRow> {
        self.points
            .iter()
            .map(|point| ChartRow {
                time: point.time,
                values: self
                    .columns
                    .iter()
                    .cloned()
                    .zip(point.values.iter().copied())
                    .collect(),
            })
            .collect()
    }

    /// Largest value across all columns, `None` without columns.
    #[must_use]
    pub fn max_value(&self) -> Option<f64> {
        self.values().reduce(f64::max)
    }

    /// Smallest value across all columns, `None` without columns.
    #[must_use]
    pub fn min_value(&self) -> Option<f64> {
        self.values().reduce(f64::min)
    }

    fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points
            .iter()
            .flat_map(|point| point.values.iter().copied())
    }
}
