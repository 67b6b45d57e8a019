mod derived;
mod sample;
mod series;

pub use derived::DerivedSeries;
pub use sample::Sample;
pub use series::{RowView, TimeSeries};
