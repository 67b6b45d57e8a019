//! `analyse`: one-shot fetch and a full analysis report.

use std::fmt;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::TimeDelta;
use corelib::{SeriesAccumulator, SeriesError, TimeSeries};
use engine::{Analyser, ExtremeScope, ExtremeSet, Window};
use market::{QuoteSource, window_start};
use tracing::info;

use crate::cli::AnalyseArgs;

const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S%:z";

pub async fn run<S: QuoteSource>(args: AnalyseArgs, source: Arc<S>) -> Result<()> {
    let end = common::time::now();
    let start = window_start(end, args.lookback.as_time_delta())?;
    let series = source
        .fetch_range(&args.symbol, start, end, &args.interval)
        .await
        .with_context(|| format!("failed to fetch {} history", args.symbol))?;

    info!(
        component = "analyse",
        symbol = %args.symbol,
        rows = series.len(),
        "history fetched"
    );

    let report = build_report(
        &series,
        &args.column,
        args.window,
        args.interval.as_time_delta(),
    )
    .with_context(|| format!("analysis of {} failed", args.symbol))?;

    println!("{report}");
    Ok(())
}

pub struct Report {
    /// Source column plus every derived series, outer-joined on timestamp.
    pub table: TimeSeries,
    pub global: ExtremeSet,
    pub local: ExtremeSet,
}

pub fn build_report(
    series: &TimeSeries,
    column: &str,
    window: Window,
    interval: TimeDelta,
) -> Result<Report, SeriesError> {
    let analyser = Analyser::with_interval(series, interval)?;

    let mut acc = SeriesAccumulator::new();
    acc.push(TimeSeries::single(
        series.index_name(),
        series.index().to_vec(),
        column,
        series.column(column)?.to_vec(),
    )?);
    acc.push(analyser.calc_movavg(window, column)?);
    acc.push(analyser.differentiate(column)?);
    acc.push(analyser.calc_autocor(column)?);

    Ok(Report {
        table: acc.join()?,
        global: analyser.find_extremes(column, ExtremeScope::Global)?,
        local: analyser.find_extremes(column, ExtremeScope::Local)?,
    })
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.table.index_name())?;
        for name in self.table.column_names() {
            write!(f, "\t{name}")?;
        }
        writeln!(f)?;

        for row in self.table.rows() {
            write!(f, "{}", row.timestamp().format(TS_FORMAT))?;
            for (_, value) in row.values() {
                write!(f, "\t{value}")?;
            }
            writeln!(f)?;
        }

        for (title, set) in [("Global extremes", &self.global), ("Local extremes", &self.local)] {
            writeln!(f, "\n{title}:")?;
            for e in set.iter() {
                writeln!(f, "{}\t{}\t{}", e.ts.format(TS_FORMAT), e.value, e.kind)?;
            }
        }

        Ok(())
    }
}
