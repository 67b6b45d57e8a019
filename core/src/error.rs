use thiserror::Error;

/// Failures raised by series construction and by every analyser query.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SeriesError {
    #[error("column not found: {0}")]
    NotFound(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl SeriesError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}
