//! One observation session: the buffer, the cached summary line and the
//! poll loop that drives them.

use std::sync::Arc;

use chrono::TimeDelta;
use common::logger::child_span;
use corelib::TimeSeries;
use engine::Window;
use market::{Interval, MarketError, QuoteSource, window_start};
use tracing::{debug, error, info};

use crate::summary::summarize;
use crate::{ObserverError, OutputSink, StopToken};

/// What a session watches and how it summarises it.
#[derive(Debug, Clone)]
pub struct SessionSpec {
    pub symbol: String,
    pub lookback: TimeDelta,
    pub interval: Interval,
    pub column: String,
    pub window: Window,
}

/// Result of one poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleOutcome {
    /// The latest sample was newer than the buffer and got appended.
    pub appended: bool,
    /// The summary line was recomputed rather than reused.
    pub recomputed: bool,
}

pub struct ObserverSession<S: QuoteSource> {
    spec: SessionSpec,
    source: Arc<S>,
    sink: Arc<dyn OutputSink>,
    buffer: TimeSeries,
    cached_line: Option<String>,
}

impl<S: QuoteSource> ObserverSession<S> {
    /// Fetch `lookback` worth of history to seed the buffer.
    pub async fn load(
        spec: SessionSpec,
        source: Arc<S>,
        sink: Arc<dyn OutputSink>,
    ) -> Result<Self, ObserverError> {
        let fetch_err = |source: MarketError| ObserverError::Fetch {
            stage: "initial history",
            source,
        };

        let end = common::time::now();
        let start = window_start(end, spec.lookback).map_err(fetch_err)?;
        let buffer = source
            .fetch_range(&spec.symbol, start, end, &spec.interval)
            .await
            .map_err(fetch_err)?;

        info!(
            component = "observer",
            symbol = %spec.symbol,
            rows = buffer.len(),
            from = ?buffer.first_timestamp(),
            to = ?buffer.last_timestamp(),
            "history loaded"
        );

        Ok(Self {
            spec,
            source,
            sink,
            buffer,
            cached_line: None,
        })
    }

    pub fn spec(&self) -> &SessionSpec {
        &self.spec
    }

    pub fn buffer(&self) -> &TimeSeries {
        &self.buffer
    }

    pub fn cached_line(&self) -> Option<&str> {
        self.cached_line.as_deref()
    }

    /// Fetch the latest sample, grow the buffer if it is new, and append a
    /// summary line to the sink.
    ///
    /// A sample that is not strictly newer than the buffer tail is dropped
    /// and the previous line is written again unchanged.
    pub async fn poll_cycle(&mut self) -> Result<CycleOutcome, ObserverError> {
        let sample = self
            .source
            .fetch_latest(&self.spec.symbol, self.spec.lookback, &self.spec.interval)
            .await
            .map_err(|source| ObserverError::Fetch {
                stage: "latest quote",
                source,
            })?;

        let appended = match self.buffer.last_timestamp() {
            Some(last) if sample.ts <= last => false,
            _ => {
                self.buffer.push(&sample)?;
                self.cached_line = None;
                true
            }
        };

        let recomputed = self.cached_line.is_none();
        let line = match self.cached_line.clone() {
            Some(line) => line,
            None => {
                let span = child_span("recompute");
                span.record("symbol", self.spec.symbol.as_str());

                let summary = span.in_scope(|| {
                    summarize(
                        &self.spec.symbol,
                        &self.buffer,
                        &self.spec.column,
                        self.spec.window,
                        self.spec.interval.as_time_delta(),
                    )
                })?;
                let line = summary.to_string();
                self.cached_line = Some(line.clone());
                line
            }
        };

        self.sink
            .append_line(&line)
            .await
            .map_err(ObserverError::Write)?;

        if appended {
            info!(component = "observer", symbol = %self.spec.symbol, %line, "summary updated");
        } else {
            debug!(component = "observer", symbol = %self.spec.symbol, "no new sample; line reused");
        }

        Ok(CycleOutcome {
            appended,
            recomputed,
        })
    }
}

/// Worker body: load history, then poll once per interval until `token` is
/// stopped.
///
/// Fail-fast. The first error stops the token before it is logged and
/// returned, so the controller never sees a "running" session that is
/// already dead.
pub async fn run_session<S: QuoteSource>(
    spec: SessionSpec,
    source: Arc<S>,
    sink: Arc<dyn OutputSink>,
    token: StopToken,
) -> Result<(), ObserverError> {
    let symbol = spec.symbol.clone();

    let result = poll_until_stopped(spec, source, sink, &token).await;

    if let Err(err) = &result {
        token.stop();
        error!(component = "observer", symbol = %symbol, error = %err, "observer session failed");
    } else {
        info!(component = "observer", symbol = %symbol, "observer session finished");
    }

    result
}

async fn poll_until_stopped<S: QuoteSource>(
    spec: SessionSpec,
    source: Arc<S>,
    sink: Arc<dyn OutputSink>,
    token: &StopToken,
) -> Result<(), ObserverError> {
    let every = spec.interval.as_std();
    let mut session = ObserverSession::load(spec, source, sink).await?;

    while !token.is_stopped() {
        session.poll_cycle().await?;

        tokio::select! {
            _ = tokio::time::sleep(every) => {}
            _ = token.stopped() => break,
        }
    }

    Ok(())
}
