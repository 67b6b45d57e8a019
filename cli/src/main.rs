mod analyse;
mod cli;
mod config;
mod watch;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use common::logger::{TraceId, init_logger, root_span};
use market::YahooChartClient;
use tracing::{Instrument, info};

use crate::cli::{Cli, Command};
use crate::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = AppConfig::from_env();

    init_logger("quotewatch", cfg.json_logs);

    let client = Arc::new(
        YahooChartClient::new(cfg.quote_api_url.clone(), cfg.http_timeout)
            .context("failed to build quote client")?,
    );

    info!(
        component = "quotewatch",
        api = %cfg.quote_api_url,
        timeout_secs = cfg.http_timeout.as_secs(),
        "quote client ready"
    );

    let trace_id = TraceId::new();

    match cli.command {
        Command::Watch(args) => {
            let output = args.output.clone().unwrap_or(cfg.output_path);
            watch::run(args, client, output)
                .instrument(root_span("watch", &trace_id))
                .await
        }
        Command::Analyse(args) => {
            let span = root_span("analyse", &trace_id);
            span.record("symbol", args.symbol.as_str());
            analyse::run(args, client).instrument(span).await
        }
    }
}
