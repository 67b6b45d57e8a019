use std::path::PathBuf;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Base URL of the chart API.
    pub quote_api_url: String,

    /// Per-request timeout for the quote client.
    pub http_timeout: Duration,

    /// Default summary file for `watch` when `--output` is not given.
    pub output_path: PathBuf,

    /// `APP_ENV=production` switches the logger to JSON lines.
    pub json_logs: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset or unparsable values fall back to
    /// the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let quote_api_url = lookup("QUOTE_API_URL")
            .unwrap_or_else(|| "https://query1.finance.yahoo.com".to_string());

        let http_timeout_secs = lookup("HTTP_TIMEOUT_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(10);

        let output_path = lookup("OUTPUT_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("stock_update.txt"));

        let json_logs = lookup("APP_ENV").is_some_and(|env| env == "production");

        Self {
            quote_api_url,
            http_timeout: Duration::from_secs(http_timeout_secs),
            output_path,
            json_logs,
        }
    }
}
