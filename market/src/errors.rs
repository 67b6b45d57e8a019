use corelib::SeriesError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarketError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("quote api error {code}: {description}")]
    Api { code: String, description: String },

    #[error("invalid response from quote api: {0}")]
    InvalidResponse(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("malformed series: {0}")]
    Series(#[from] SeriesError),
}
