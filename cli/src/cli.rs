use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use engine::Window;
use market::Interval;

#[derive(Debug, Parser)]
#[clap(name = "quotewatch", version)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Observe symbols live and append a summary line per poll
    Watch(WatchArgs),
    /// Fetch once, run every analysis and print the joined table
    Analyse(AnalyseArgs),
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Symbols to observe (comma-separated)
    #[clap(long, value_delimiter = ',', default_values_t = ["MSFT".to_string(), "IBM".to_string()])]
    pub symbols: Vec<String>,

    /// Column the moving average is computed over
    #[clap(long, default_value = "Open")]
    pub column: String,

    /// Moving-average window: a row count (`20`) or a duration (`3d`)
    #[clap(long, default_value = "20", value_parser = parse_window)]
    pub window: Window,

    /// History fetched at start and searched for the latest quote
    #[clap(long, default_value = "5d")]
    pub lookback: Interval,

    /// Quote sampling interval and poll period
    #[clap(long, default_value = "1m")]
    pub interval: Interval,

    /// Stop all observers after this long
    #[clap(long, default_value = "180s")]
    pub run_for: Interval,

    /// Summary file; defaults to OUTPUT_PATH
    #[clap(long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct AnalyseArgs {
    #[clap(long)]
    pub symbol: String,

    #[clap(long, default_value = "Open")]
    pub column: String,

    /// Moving-average window: a row count (`20`) or a duration (`3d`)
    #[clap(long, default_value = "20", value_parser = parse_window)]
    pub window: Window,

    #[clap(long, default_value = "1mo")]
    pub lookback: Interval,

    #[clap(long, default_value = "1d")]
    pub interval: Interval,
}

/// A bare integer is a row count, anything else an interval string.
pub(crate) fn parse_window(raw: &str) -> Result<Window, String> {
    let raw = raw.trim();

    let window = match raw.parse::<usize>() {
        Ok(count) => Window::Count(count),
        Err(_) => {
            let interval: Interval = raw.parse().map_err(|e| format!("{e}"))?;
            Window::Duration(interval.as_time_delta())
        }
    };

    window.validate().map_err(|e| e.to_string())?;
    Ok(window)
}
