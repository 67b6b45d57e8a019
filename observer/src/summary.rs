//! The one-line analytics summary written on every poll cycle.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use common::logger::child_span;
use corelib::{SeriesError, TimeSeries};
use engine::{Analyser, MOVING_AVG, Window};

/// Latest point of each metric for one symbol/column.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub symbol: String,
    pub ts: DateTime<Utc>,
    pub column: String,
    pub value: f64,
    pub moving_avg: f64,
    pub diff: f64,
    pub autocor: f64,
}

impl fmt::Display for Summary {
    // Consumers parse this byte-for-byte, including the double space
    // before "Autocor".
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} => Date: {}, {}: {}, Moving avg: {}, Diff: {},  Autocor: {}",
            self.symbol,
            self.ts.format("%Y-%m-%d %H:%M:%S%:z"),
            self.column,
            float_repr(self.value),
            float_repr(self.moving_avg),
            float_repr(self.diff),
            float_repr(self.autocor),
        )
    }
}

/// Shortest round-trip rendering in the established line format: integral
/// values keep a `.0`, non-finite values are `nan`/`inf`, and magnitudes
/// outside `1e-4..1e16` switch to `1.5e-07` style exponents.
fn float_repr(v: f64) -> String {
    if v.is_nan() {
        return "nan".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let sci = format!("{v:e}");
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return v.to_string();
    };
    let Ok(exp) = exp.parse::<i32>() else {
        return v.to_string();
    };

    if (-4..16).contains(&exp) {
        let plain = v.to_string();
        if plain.contains('.') {
            plain
        } else {
            format!("{plain}.0")
        }
    } else {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exp.abs())
    }
}

/// Moving average of `column` over `buffer`, then the differential and the
/// autocorrelation of that moving average; the latest point of each.
///
/// `interval` is the base sampling interval for both analysers.
pub fn summarize(
    symbol: &str,
    buffer: &TimeSeries,
    column: &str,
    window: Window,
    interval: TimeDelta,
) -> Result<Summary, SeriesError> {
    let _span = child_span("summarize").entered();

    let last = buffer
        .last_row()
        .ok_or_else(|| SeriesError::invalid("cannot summarize an empty buffer"))?;
    let value = last
        .get(column)
        .ok_or_else(|| SeriesError::NotFound(column.to_string()))?;

    let movavg = Analyser::with_interval(buffer, interval)?.calc_movavg(window, column)?;

    let on_avg = Analyser::with_interval(movavg.as_series(), interval)?;
    let diff = on_avg.differentiate(MOVING_AVG)?;
    let autocor = on_avg.calc_autocor(MOVING_AVG)?;

    let latest = |name: &str, point: Option<(DateTime<Utc>, f64)>| {
        point
            .map(|(_, v)| v)
            .ok_or_else(|| SeriesError::invalid(format!("{name} series is empty")))
    };

    Ok(Summary {
        symbol: symbol.to_string(),
        ts: last.timestamp(),
        column: column.to_string(),
        value,
        moving_avg: latest("moving average", movavg.last())?,
        diff: latest("differential", diff.last())?,
        autocor: latest("autocorrelation", autocor.last())?,
    })
}
