//! `watch`: one observer per symbol, all appending to one file.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use market::QuoteSource;
use observer::{Observer, ObserverConfig};
use tokio::time::{MissedTickBehavior, interval};
use tracing::{error, info, warn};

use crate::cli::WatchArgs;

/// How often the supervisor checks for workers that died on their own.
const SUPERVISE_EVERY: Duration = Duration::from_secs(1);

pub async fn run<S: QuoteSource>(args: WatchArgs, source: Arc<S>, output: PathBuf) -> Result<()> {
    let mut observers = Vec::with_capacity(args.symbols.len());

    for symbol in &args.symbols {
        let config = ObserverConfig {
            symbol: symbol.clone(),
            lookback: args.lookback.as_time_delta(),
            interval: args.interval.clone(),
        };

        let mut obs = Observer::new(config, source.clone());
        obs.start(&args.column, args.window, &output)
            .with_context(|| format!("failed to start observer for {symbol}"))?;
        observers.push(obs);
    }

    info!(
        component = "watch",
        symbols = ?args.symbols,
        output = %output.display(),
        run_for = %args.run_for,
        "observers running"
    );

    let deadline = tokio::time::sleep(args.run_for.as_std());
    tokio::pin!(deadline);

    let mut ticker = interval(SUPERVISE_EVERY);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = &mut deadline => {
                info!(component = "watch", "run time elapsed");
                break;
            }
            res = tokio::signal::ctrl_c() => {
                res.context("failed to listen for ctrl-c")?;
                warn!(component = "watch", "interrupted");
                break;
            }
            _ = ticker.tick() => {
                if observers.iter().any(|o| !o.is_running()) {
                    break;
                }
            }
        }
    }

    shutdown(observers).await
}

/// Stop live observers and collect the outcome of dead ones. The first
/// worker failure becomes the command's error.
async fn shutdown<S: QuoteSource>(observers: Vec<Observer<S>>) -> Result<()> {
    let mut failure = None;

    for mut obs in observers {
        if obs.is_running() {
            obs.stop().await;
            continue;
        }

        if let Err(err) = obs.join().await {
            error!(component = "watch", symbol = %obs.symbol(), error = %err, "observer died");
            if failure.is_none() {
                failure = Some(
                    anyhow::Error::new(err)
                        .context(format!("observer for {} failed", obs.symbol())),
                );
            }
        }
    }

    match failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
