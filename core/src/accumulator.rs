//! Caller-owned collector for results that should end up in one table.
//!
//! Analyser operations never register their output anywhere; the
//! orchestrating code pushes whatever it wants joined and calls `join`.
//! Several accumulators can live side by side.

use std::collections::{BTreeSet, HashSet};

use chrono::{DateTime, Utc};

use crate::{SeriesError, TimeSeries};

#[derive(Debug, Clone, Default)]
pub struct SeriesAccumulator {
    pending: Vec<TimeSeries>,
}

impl SeriesAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, series: impl Into<TimeSeries>) {
        self.pending.push(series.into());
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Outer-join every pending series on timestamp.
    ///
    /// The result carries the union of all indexes and every column of every
    /// pending series, in push order; cells a series has no row for are NaN.
    /// The index name is taken from the first series.
    pub fn join(&self) -> Result<TimeSeries, SeriesError> {
        let first = self
            .pending
            .first()
            .ok_or_else(|| SeriesError::invalid("nothing to join"))?;

        let index: Vec<DateTime<Utc>> = self
            .pending
            .iter()
            .flat_map(|s| s.index().iter().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut seen = HashSet::new();
        let mut columns = Vec::new();

        for series in &self.pending {
            for name in series.column_names() {
                if !seen.insert(name.to_string()) {
                    return Err(SeriesError::invalid(format!(
                        "column '{name}' is pending twice"
                    )));
                }

                let values = series.column(name)?;
                let src = series.index();
                let mut cursor = 0;

                // both indexes are sorted: walk them together
                let joined = index
                    .iter()
                    .map(|ts| {
                        while cursor < src.len() && src[cursor] < *ts {
                            cursor += 1;
                        }
                        if cursor < src.len() && src[cursor] == *ts {
                            values[cursor]
                        } else {
                            f64::NAN
                        }
                    })
                    .collect();

                columns.push((name.to_string(), joined));
            }
        }

        TimeSeries::new(first.index_name(), index, columns)
    }
}
