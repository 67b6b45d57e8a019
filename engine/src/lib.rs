//! Pure analytics over a `TimeSeries` snapshot.
//!
//! Every query borrows the series immutably and returns a fresh result, so an
//! `Analyser` can be shared between readers freely.

pub mod analyser;
pub mod extremes;
mod stats;
pub mod window;

pub use analyser::{AUTOCOR, Analyser, DIFF, MOVING_AVG};
pub use extremes::{Extreme, ExtremeKind, ExtremeScope, ExtremeSet};
pub use window::Window;
