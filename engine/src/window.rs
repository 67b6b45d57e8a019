use std::fmt;

use chrono::TimeDelta;
use corelib::SeriesError;

/// Bound on the trailing samples a moving average looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    /// Last `k` samples, fewer near the start of the series.
    Count(usize),
    /// Every sample no older than this relative to the current one.
    Duration(TimeDelta),
}

impl Window {
    pub fn validate(&self) -> Result<(), SeriesError> {
        match self {
            Window::Count(0) => Err(SeriesError::invalid("window is less than 1")),
            Window::Duration(d) if *d < TimeDelta::zero() => Err(SeriesError::invalid(format!(
                "window duration is negative ({d})"
            ))),
            _ => Ok(()),
        }
    }
}

impl From<usize> for Window {
    fn from(k: usize) -> Self {
        Window::Count(k)
    }
}

impl From<TimeDelta> for Window {
    fn from(d: TimeDelta) -> Self {
        Window::Duration(d)
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Window::Count(k) => write!(f, "{k} samples"),
            Window::Duration(d) => write!(f, "{d}"),
        }
    }
}
