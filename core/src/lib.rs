//! Time-indexed series model shared by the analyser, the quote client and
//! the observer.

pub mod accumulator;
pub mod error;
pub mod models;

pub use accumulator::SeriesAccumulator;
pub use error::SeriesError;
pub use models::{DerivedSeries, RowView, Sample, TimeSeries};
