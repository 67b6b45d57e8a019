//! Controller for one symbol's background worker.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::TimeDelta;
use common::logger::{TraceId, root_span};
use engine::Window;
use futures::FutureExt;
use market::{Interval, QuoteSource, window_start};
use tokio::task::JoinHandle;
use tracing::{Instrument, error, info, warn};

use crate::session::{SessionSpec, run_session};
use crate::{FileSink, ObserverError, OutputSink, StopToken};

/// Symbol plus fetch parameters; fixed for the observer's lifetime.
#[derive(Debug, Clone)]
pub struct ObserverConfig {
    pub symbol: String,
    /// How far back the initial history and every latest-quote fetch reach.
    pub lookback: TimeDelta,
    /// Sampling interval of the quotes and the sleep between poll cycles.
    pub interval: Interval,
}

struct SessionHandle {
    token: StopToken,
    worker: JoinHandle<Result<(), ObserverError>>,
}

/// Owns at most one running session at a time.
///
/// `start` spawns the worker on the current tokio runtime; `stop` and `join`
/// wait for it. Dropping the observer only signals the worker.
pub struct Observer<S: QuoteSource> {
    config: ObserverConfig,
    source: Arc<S>,
    trace_id: TraceId,
    session: Option<SessionHandle>,
}

impl<S: QuoteSource> Observer<S> {
    pub fn new(config: ObserverConfig, source: Arc<S>) -> Self {
        Self {
            config,
            source,
            trace_id: TraceId::new(),
            session: None,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.config.symbol
    }

    pub fn config(&self) -> &ObserverConfig {
        &self.config
    }

    pub fn trace_id(&self) -> TraceId {
        self.trace_id
    }

    /// A session exists, its token has not been stopped and its worker task
    /// is still alive. A worker that failed or panicked turns this false
    /// without anyone calling `stop`.
    pub fn is_running(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| !s.token.is_stopped() && !s.worker.is_finished())
    }

    /// Start observing `column`, appending one line per cycle to the file at
    /// `path`.
    pub fn start(
        &mut self,
        column: impl Into<String>,
        window: Window,
        path: impl Into<PathBuf>,
    ) -> Result<(), ObserverError> {
        self.start_with_sink(column, window, Arc::new(FileSink::new(path)))
    }

    pub fn start_with_sink(
        &mut self,
        column: impl Into<String>,
        window: Window,
        sink: Arc<dyn OutputSink>,
    ) -> Result<(), ObserverError> {
        let symbol = self.config.symbol.clone();

        if self.is_running() {
            error!(component = "observer", symbol = %symbol, "observer already running");
            return Err(ObserverError::AlreadyRunning { symbol });
        }

        self.reap_dead_session();

        window
            .validate()
            .map_err(|e| ObserverError::InvalidArgument(e.to_string()))?;

        window_start(common::time::now(), self.config.lookback)
            .map_err(|e| ObserverError::InvalidArgument(e.to_string()))?;

        let column = column.into();
        if column.is_empty() {
            return Err(ObserverError::InvalidArgument("column name is empty".into()));
        }

        let spec = SessionSpec {
            symbol: symbol.clone(),
            lookback: self.config.lookback,
            interval: self.config.interval.clone(),
            column: column.clone(),
            window,
        };

        let token = StopToken::new();
        let span = root_span("observer_worker", &self.trace_id);
        span.record("symbol", symbol.as_str());

        let worker = tokio::spawn(
            run_session(spec, self.source.clone(), sink, token.clone()).instrument(span),
        );
        self.session = Some(SessionHandle { token, worker });

        info!(
            component = "observer",
            symbol = %symbol,
            column = %column,
            window = %window,
            interval = %self.config.interval,
            trace_id = %self.trace_id,
            "observer started"
        );

        Ok(())
    }

    /// Signal the worker and wait for it to finish. Worker failures are
    /// logged, never returned.
    pub async fn stop(&mut self) {
        let Some(handle) = self.session.take() else {
            warn!(component = "observer", symbol = %self.config.symbol, "observer not running");
            return;
        };

        handle.token.stop();

        match handle.worker.await {
            Ok(Ok(())) => {
                info!(component = "observer", symbol = %self.config.symbol, "observer stopped")
            }
            Ok(Err(err)) => warn!(
                component = "observer",
                symbol = %self.config.symbol,
                error = %err,
                "observer stopped after worker failure"
            ),
            Err(err) => error!(
                component = "observer",
                symbol = %self.config.symbol,
                error = %err,
                "observer worker aborted"
            ),
        }
    }

    /// Wait for the worker to finish on its own and hand back its outcome.
    /// `Ok` when no session exists.
    pub async fn join(&mut self) -> Result<(), ObserverError> {
        match self.session.take() {
            Some(handle) => handle.worker.await?,
            None => Ok(()),
        }
    }

    /// Drop a session whose worker stopped itself, logging its outcome if it
    /// has already finished.
    fn reap_dead_session(&mut self) {
        let Some(handle) = self.session.take() else {
            return;
        };

        match handle.worker.now_or_never() {
            Some(Ok(Err(err))) => warn!(
                component = "observer",
                symbol = %self.config.symbol,
                error = %err,
                "previous session had failed"
            ),
            Some(Err(err)) => warn!(
                component = "observer",
                symbol = %self.config.symbol,
                error = %err,
                "previous session aborted"
            ),
            _ => {}
        }
    }
}

impl<S: QuoteSource> Drop for Observer<S> {
    fn drop(&mut self) {
        if let Some(handle) = &self.session {
            handle.token.stop();
        }
    }
}
