use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use corelib::TimeSeries;
use reqwest::Client;
use tracing::{debug, instrument};

use crate::yahoo::types::{ChartEnvelope, parse_chart};
use crate::{Interval, MarketError, QuoteSource};

const USER_AGENT: &str = concat!("quotewatch/", env!("CARGO_PKG_VERSION"));

/// HTTP client for the Yahoo Finance v8 chart endpoint.
#[derive(Clone)]
pub struct YahooChartClient {
    http: Client,
    url: String,
}

impl YahooChartClient {
    /// `url` is the API base, e.g. `https://query1.finance.yahoo.com`.
    /// `timeout` bounds each request; there is no retry on top of it.
    pub fn new(url: String, timeout: Duration) -> Result<Self, MarketError> {
        let http = Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            url: url.trim_end_matches('/').to_string(),
        })
    }

    #[instrument(
        skip(self, start, end),
        fields(symbol = %symbol, interval = %interval),
        level = "debug"
    )]
    pub async fn fetch_chart(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        interval: &Interval,
    ) -> Result<TimeSeries, MarketError> {
        let url = format!("{}/v8/finance/chart/{}", self.url, symbol);

        let resp = self
            .http
            .get(&url)
            .query(&[
                ("period1", start.timestamp().to_string()),
                ("period2", end.timestamp().to_string()),
                ("interval", interval.to_string()),
                ("includePrePost", "false".to_string()),
            ])
            .send()
            .await?;

        let status = resp.status();
        let body = resp.bytes().await?;

        // error bodies are JSON too and carry a better description than the status
        let envelope: ChartEnvelope = serde_json::from_slice(&body).map_err(|e| {
            if status.is_success() {
                MarketError::InvalidResponse(e.to_string())
            } else {
                MarketError::InvalidResponse(format!("status {status}"))
            }
        })?;

        let series = parse_chart(envelope)?;

        debug!(
            component = "market",
            rows = series.len(),
            last = ?series.last_timestamp(),
            "chart fetched"
        );

        Ok(series)
    }
}

#[async_trait]
impl QuoteSource for YahooChartClient {
    async fn fetch_range(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        interval: &Interval,
    ) -> Result<TimeSeries, MarketError> {
        self.fetch_chart(symbol, start, end, interval).await
    }
}
