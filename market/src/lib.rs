//! Upstream quote access.
//!
//! The observer and the CLI only see the `QuoteSource` trait; the Yahoo
//! chart client is the production implementation.

pub mod errors;
pub mod interval;
pub mod source;
pub mod yahoo;

pub use errors::MarketError;
pub use interval::Interval;
pub use source::{QuoteSource, window_start};
pub use yahoo::YahooChartClient;
