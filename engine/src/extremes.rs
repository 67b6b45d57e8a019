use std::fmt;

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtremeKind {
    Min,
    Max,
}

impl fmt::Display for ExtremeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtremeKind::Min => f.write_str("Min"),
            ExtremeKind::Max => f.write_str("Max"),
        }
    }
}

/// Which extrema `find_extremes` reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtremeScope {
    /// The single global minimum and maximum.
    Global,
    /// Every interior turning point (plateaus included).
    Local,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extreme {
    pub ts: DateTime<Utc>,
    pub value: f64,
    pub kind: ExtremeKind,
}

/// Extrema in index order (global: min first, then max).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtremeSet {
    rows: Vec<Extreme>,
}

impl ExtremeSet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Extreme> {
        self.rows.iter()
    }

    pub fn of_kind(&self, kind: ExtremeKind) -> impl Iterator<Item = &Extreme> {
        self.rows.iter().filter(move |e| e.kind == kind)
    }

    pub fn as_slice(&self) -> &[Extreme] {
        &self.rows
    }
}

impl From<Vec<Extreme>> for ExtremeSet {
    fn from(rows: Vec<Extreme>) -> Self {
        Self { rows }
    }
}

impl<'a> IntoIterator for &'a ExtremeSet {
    type Item = &'a Extreme;
    type IntoIter = std::slice::Iter<'a, Extreme>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
