//! Timestamp-indexed table of named numeric columns.
//!
//! Invariants held by every `TimeSeries`:
//!   • timestamps are unique and strictly increasing
//!   • at least one column exists, and column names are unique
//!   • every column has exactly one value per timestamp

use std::collections::HashSet;

use chrono::{DateTime, TimeDelta, Utc};

use super::Sample;
use crate::SeriesError;

#[derive(Debug, Clone, PartialEq)]
struct Column {
    name: String,
    values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    index_name: String,
    index: Vec<DateTime<Utc>>,
    columns: Vec<Column>,
}

impl TimeSeries {
    /// Build a series from an index and `(name, values)` columns.
    pub fn new(
        index_name: impl Into<String>,
        index: Vec<DateTime<Utc>>,
        columns: Vec<(String, Vec<f64>)>,
    ) -> Result<Self, SeriesError> {
        if columns.is_empty() {
            return Err(SeriesError::invalid("a series needs at least one column"));
        }

        if let Some(pos) = index.windows(2).position(|w| w[1] <= w[0]) {
            return Err(SeriesError::invalid(format!(
                "timestamps must be strictly increasing (row {} at {} follows {})",
                pos + 1,
                index[pos + 1],
                index[pos]
            )));
        }

        let mut seen = HashSet::new();
        for (name, values) in &columns {
            if !seen.insert(name.as_str()) {
                return Err(SeriesError::invalid(format!("duplicate column '{name}'")));
            }
            if values.len() != index.len() {
                return Err(SeriesError::invalid(format!(
                    "column '{name}' has {} values for {} timestamps",
                    values.len(),
                    index.len()
                )));
            }
        }

        Ok(Self {
            index_name: index_name.into(),
            index,
            columns: columns
                .into_iter()
                .map(|(name, values)| Column { name, values })
                .collect(),
        })
    }

    /// Convenience constructor for a one-column series.
    pub fn single(
        index_name: impl Into<String>,
        index: Vec<DateTime<Utc>>,
        column: impl Into<String>,
        values: Vec<f64>,
    ) -> Result<Self, SeriesError> {
        Self::new(index_name, index, vec![(column.into(), values)])
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    pub fn index(&self) -> &[DateTime<Utc>] {
        &self.index
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// Values of `name`, or `NotFound`.
    pub fn column(&self, name: &str) -> Result<&[f64], SeriesError> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
            .ok_or_else(|| SeriesError::NotFound(name.to_string()))
    }

    pub fn first_timestamp(&self) -> Option<DateTime<Utc>> {
        self.index.first().copied()
    }

    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.index.last().copied()
    }

    /// Smallest gap between consecutive timestamps; `None` below two rows.
    pub fn min_interval(&self) -> Option<TimeDelta> {
        self.index.windows(2).map(|w| w[1] - w[0]).min()
    }

    pub fn row(&self, pos: usize) -> Option<RowView<'_>> {
        (pos < self.len()).then_some(RowView { series: self, pos })
    }

    pub fn last_row(&self) -> Option<RowView<'_>> {
        self.len().checked_sub(1).and_then(|pos| self.row(pos))
    }

    pub fn rows(&self) -> impl Iterator<Item = RowView<'_>> {
        (0..self.len()).map(move |pos| RowView { series: self, pos })
    }

    /// Append one row at the end.
    ///
    /// The sample must be strictly newer than the last row and must carry a
    /// value for every column; extra sample fields are ignored.
    pub fn push(&mut self, sample: &Sample) -> Result<(), SeriesError> {
        if let Some(last) = self.last_timestamp() {
            if sample.ts <= last {
                return Err(SeriesError::invalid(format!(
                    "sample at {} is not newer than last row at {}",
                    sample.ts, last
                )));
            }
        }

        let mut row = Vec::with_capacity(self.columns.len());
        for col in &self.columns {
            let value = sample
                .get(&col.name)
                .ok_or_else(|| SeriesError::NotFound(col.name.clone()))?;
            row.push(value);
        }

        for (col, value) in self.columns.iter_mut().zip(row) {
            col.values.push(value);
        }
        self.index.push(sample.ts);

        Ok(())
    }
}

/// Borrowed view of one row.
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    series: &'a TimeSeries,
    pos: usize,
}

impl<'a> RowView<'a> {
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.series.index[self.pos]
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        self.series
            .columns
            .iter()
            .find(|c| c.name == column)
            .map(|c| c.values[self.pos])
    }

    /// `(column, value)` pairs in column order.
    pub fn values(&self) -> impl Iterator<Item = (&'a str, f64)> + 'a {
        let pos = self.pos;
        self.series
            .columns
            .iter()
            .map(move |c| (c.name.as_str(), c.values[pos]))
    }

    pub fn to_sample(&self) -> Sample {
        let mut sample = Sample::new(self.timestamp());
        for (name, value) in self.values() {
            sample.insert(name, value);
        }
        sample
    }
}
