//! Live quote observer.
//!
//! An `Observer` keeps one symbol's series current against a `QuoteSource`
//! and appends a one-line analytics summary to an `OutputSink` on every poll
//! cycle. The worker is fail-fast: any fetch, analysis or write failure stops
//! the session and is handed to whoever joins the worker.

pub mod error;
pub mod observer;
pub mod session;
pub mod sink;
pub mod stop_token;
pub mod summary;

pub use error::ObserverError;
pub use observer::{Observer, ObserverConfig};
pub use session::{CycleOutcome, ObserverSession, SessionSpec, run_session};
pub use sink::{FileSink, OutputSink};
pub use stop_token::StopToken;
pub use summary::{Summary, summarize};
