use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use corelib::{Sample, TimeSeries};

use crate::{Interval, MarketError};

/// `end - lookback`, or `InvalidArgument` when that falls outside the
/// representable calendar.
pub fn window_start(end: DateTime<Utc>, lookback: TimeDelta) -> Result<DateTime<Utc>, MarketError> {
    end.checked_sub_signed(lookback).ok_or_else(|| {
        MarketError::InvalidArgument(format!("lookback {lookback} reaches past the calendar"))
    })
}

/// Abstraction over the upstream quote provider.
///
/// Implementations report failures as-is; callers decide whether a failure
/// is fatal (the observer never retries).
#[async_trait]
pub trait QuoteSource: Send + Sync + 'static {
    /// Rows in `[start, end]` sampled at `interval`.
    async fn fetch_range(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        interval: &Interval,
    ) -> Result<TimeSeries, MarketError>;

    /// Most recent row within `lookback` of now.
    async fn fetch_latest(
        &self,
        symbol: &str,
        lookback: TimeDelta,
        interval: &Interval,
    ) -> Result<Sample, MarketError> {
        let end = common::time::now();
        let start = window_start(end, lookback)?;
        let series = self.fetch_range(symbol, start, end, interval).await?;

        series
            .last_row()
            .map(|row| row.to_sample())
            .ok_or_else(|| {
                MarketError::InvalidResponse(format!("no quotes for {symbol} in the last {lookback}"))
            })
    }
}
