use chrono::{DateTime, Utc};

use super::TimeSeries;
use crate::SeriesError;

/// Single-column output of an analyser transform.
///
/// Immutable once produced; the index is the source index or a trimmed
/// sub-range of it.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedSeries {
    name: String,
    series: TimeSeries,
}

impl DerivedSeries {
    pub fn new(
        index_name: impl Into<String>,
        index: Vec<DateTime<Utc>>,
        name: impl Into<String>,
        values: Vec<f64>,
    ) -> Result<Self, SeriesError> {
        let name = name.into();
        let series = TimeSeries::single(index_name, index, name.clone(), values)?;
        Ok(Self { name, series })
    }

    /// Output column name (e.g. `Moving avg`).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index(&self) -> &[DateTime<Utc>] {
        self.series.index()
    }

    pub fn values(&self) -> &[f64] {
        // the single column always exists
        self.series.column(&self.name).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Latest `(timestamp, value)` point.
    pub fn last(&self) -> Option<(DateTime<Utc>, f64)> {
        let ts = self.series.last_timestamp()?;
        let value = *self.values().last()?;
        Some((ts, value))
    }

    pub fn as_series(&self) -> &TimeSeries {
        &self.series
    }

    pub fn into_series(self) -> TimeSeries {
        self.series
    }
}

impl From<DerivedSeries> for TimeSeries {
    fn from(derived: DerivedSeries) -> Self {
        derived.into_series()
    }
}
