//! Wire types of the Yahoo Finance chart endpoint and their conversion into
//! a `TimeSeries`.

use chrono::{DateTime, Utc};
use corelib::TimeSeries;
use serde::Deserialize;

use crate::MarketError;

/// Index name used for every fetched series.
pub const INDEX_NAME: &str = "Datetime";

#[derive(Debug, Deserialize)]
pub struct ChartEnvelope {
    pub chart: Chart,
}

#[derive(Debug, Deserialize)]
pub struct Chart {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
pub struct ChartError {
    pub code: String,
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct ChartResult {
    pub meta: ChartMeta,

    /// Absent when the range holds no trading activity.
    #[serde(default)]
    pub timestamp: Vec<i64>,

    pub indicators: Indicators,
}

#[derive(Debug, Deserialize)]
pub struct ChartMeta {
    pub symbol: String,
}

#[derive(Debug, Deserialize)]
pub struct Indicators {
    #[serde(default)]
    pub quote: Vec<QuoteBlock>,
}

/// Column-major OHLCV block; `null` marks a missing bar.
#[derive(Debug, Default, Deserialize)]
pub struct QuoteBlock {
    #[serde(default)]
    pub open: Vec<Option<f64>>,
    #[serde(default)]
    pub high: Vec<Option<f64>>,
    #[serde(default)]
    pub low: Vec<Option<f64>>,
    #[serde(default)]
    pub close: Vec<Option<f64>>,
    #[serde(default)]
    pub volume: Vec<Option<f64>>,
}

/// Convert a decoded envelope into an OHLCV series.
///
/// Rows with any missing field are dropped, and so are rows that do not
/// advance the timestamp (the endpoint repeats the live bar at the end).
pub fn parse_chart(envelope: ChartEnvelope) -> Result<TimeSeries, MarketError> {
    if let Some(err) = envelope.chart.error {
        return Err(MarketError::Api {
            code: err.code,
            description: err.description,
        });
    }

    let result = envelope
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| MarketError::InvalidResponse("chart has no result".into()))?;

    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let fields = [
        ("Open", &quote.open),
        ("High", &quote.high),
        ("Low", &quote.low),
        ("Close", &quote.close),
        ("Volume", &quote.volume),
    ];

    let n = result.timestamp.len();
    if let Some((name, _)) = fields.iter().find(|(_, col)| col.len() != n) {
        return Err(MarketError::InvalidResponse(format!(
            "{}: column {name} does not match {n} timestamps",
            result.meta.symbol
        )));
    }

    let mut index: Vec<DateTime<Utc>> = Vec::with_capacity(n);
    let mut columns: Vec<(String, Vec<f64>)> = fields
        .iter()
        .map(|(name, _)| (name.to_string(), Vec::with_capacity(n)))
        .collect();

    for (row, secs) in result.timestamp.iter().enumerate() {
        let ts = DateTime::from_timestamp(*secs, 0).ok_or_else(|| {
            MarketError::InvalidResponse(format!("timestamp {secs} out of range"))
        })?;

        if index.last().is_some_and(|last| ts <= *last) {
            continue;
        }

        let values: Option<Vec<f64>> = fields.iter().map(|(_, col)| col[row]).collect();
        let Some(values) = values else {
            continue;
        };

        index.push(ts);
        for ((_, column), value) in columns.iter_mut().zip(values) {
            column.push(value);
        }
    }

    Ok(TimeSeries::new(INDEX_NAME, index, columns)?)
}
