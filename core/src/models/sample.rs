use std::collections::HashMap;

use chrono::{DateTime, Utc};

/// One fetched row: a timestamp plus a value per column name.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub ts: DateTime<Utc>,
    pub values: HashMap<String, f64>,
}

impl Sample {
    pub fn new(ts: DateTime<Utc>) -> Self {
        Self {
            ts,
            values: HashMap::new(),
        }
    }

    /// Builder-style insert.
    pub fn with(mut self, column: impl Into<String>, value: f64) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, value: f64) {
        self.values.insert(column.into(), value);
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        self.values.get(column).copied()
    }
}
