use corelib::SeriesError;
use market::MarketError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ObserverError {
    #[error("observer for {symbol} is already running")]
    AlreadyRunning { symbol: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("failed to fetch {stage}: {source}")]
    Fetch {
        stage: &'static str,
        #[source]
        source: MarketError,
    },

    #[error("failed to write summary line: {0}")]
    Write(#[source] std::io::Error),

    #[error("analysis failed: {0}")]
    Analysis(#[from] SeriesError),

    #[error("observer worker aborted: {0}")]
    Worker(#[from] tokio::task::JoinError),
}
