//! Time-series analyser.
//!
//! Derives extrema, the time-normalised differential, trailing moving
//! averages and the lag-sweep autocorrelation of one column.
//!
//! Failure kinds are typed:
//!   • unknown column            → `SeriesError::NotFound`
//!   • series too short / window → `SeriesError::InvalidArgument`

use chrono::{DateTime, TimeDelta, Utc};
use corelib::{DerivedSeries, SeriesError, TimeSeries};

use crate::extremes::{Extreme, ExtremeKind, ExtremeScope, ExtremeSet};
use crate::stats::{is_constant, mean, seconds, std};
use crate::window::Window;

/// Output column of `calc_movavg`.
pub const MOVING_AVG: &str = "Moving avg";
/// Output column of `differentiate`.
pub const DIFF: &str = "Diff";
/// Output column of `calc_autocor`.
pub const AUTOCOR: &str = "Autocor";

/// Read-only view over one series plus the base sampling interval used to
/// normalise differentials.
#[derive(Debug, Clone, Copy)]
pub struct Analyser<'a> {
    series: &'a TimeSeries,
    interval: Option<TimeDelta>,
}

impl<'a> Analyser<'a> {
    /// Base interval is derived as the smallest gap between rows.
    pub fn new(series: &'a TimeSeries) -> Self {
        Self {
            series,
            interval: None,
        }
    }

    /// Base interval is supplied by the caller and must be positive.
    pub fn with_interval(series: &'a TimeSeries, interval: TimeDelta) -> Result<Self, SeriesError> {
        if interval <= TimeDelta::zero() {
            return Err(SeriesError::invalid(format!(
                "base interval must be positive, got {interval}"
            )));
        }

        Ok(Self {
            series,
            interval: Some(interval),
        })
    }

    pub fn series(&self) -> &'a TimeSeries {
        self.series
    }

    /// Supplied interval, else the minimum gap between consecutive rows.
    pub fn interval(&self) -> Result<TimeDelta, SeriesError> {
        match self.interval {
            Some(interval) => Ok(interval),
            None => self.series.min_interval().ok_or_else(|| {
                SeriesError::invalid("sampling interval needs at least two rows")
            }),
        }
    }

    fn values(&self, col: &str, min_len: usize, op: &str) -> Result<&'a [f64], SeriesError> {
        let values = self.series.column(col)?;
        if values.len() < min_len {
            return Err(SeriesError::invalid(format!(
                "{op} needs at least {min_len} rows, series has {}",
                values.len()
            )));
        }
        Ok(values)
    }

    fn derived(
        &self,
        index: &[DateTime<Utc>],
        name: &str,
        values: Vec<f64>,
    ) -> Result<DerivedSeries, SeriesError> {
        DerivedSeries::new(self.series.index_name(), index.to_vec(), name, values)
    }

    /// Global minimum; ties resolve to the earliest row.
    pub fn find_min(&self, col: &str) -> Result<Extreme, SeriesError> {
        self.find_global(col, ExtremeKind::Min)
    }

    /// Global maximum; ties resolve to the earliest row.
    pub fn find_max(&self, col: &str) -> Result<Extreme, SeriesError> {
        self.find_global(col, ExtremeKind::Max)
    }

    fn find_global(&self, col: &str, kind: ExtremeKind) -> Result<Extreme, SeriesError> {
        let values = self.values(col, 1, "extrema search")?;

        let mut best = 0;
        for (i, v) in values.iter().enumerate().skip(1) {
            let better = match kind {
                ExtremeKind::Min => *v < values[best],
                ExtremeKind::Max => *v > values[best],
            };
            if better {
                best = i;
            }
        }

        Ok(Extreme {
            ts: self.series.index()[best],
            value: values[best],
            kind,
        })
    }

    pub fn find_extremes(&self, col: &str, scope: ExtremeScope) -> Result<ExtremeSet, SeriesError> {
        match scope {
            ExtremeScope::Global => Ok(vec![self.find_min(col)?, self.find_max(col)?].into()),
            ExtremeScope::Local => self.find_local_extremes(col),
        }
    }

    /// Interior turning points.
    ///
    /// The Min test runs first, so a flat point that is both ≤ and ≥ its
    /// neighbours is reported as Min.
    fn find_local_extremes(&self, col: &str) -> Result<ExtremeSet, SeriesError> {
        let values = self.values(col, 1, "extrema search")?;
        let index = self.series.index();

        let rows = values
            .windows(3)
            .enumerate()
            .filter_map(|(offset, w)| {
                let (prev, cur, next) = (w[0], w[1], w[2]);
                let kind = if cur <= prev && cur <= next {
                    ExtremeKind::Min
                } else if cur >= prev && cur >= next {
                    ExtremeKind::Max
                } else {
                    return None;
                };

                Some(Extreme {
                    ts: index[offset + 1],
                    value: cur,
                    kind,
                })
            })
            .collect::<Vec<_>>();

        Ok(rows.into())
    }

    /// `(v[i+1] - v[i]) / ((t[i+1] - t[i]) / base_interval)`, indexed by the
    /// left endpoint of each pair.
    pub fn differentiate(&self, col: &str) -> Result<DerivedSeries, SeriesError> {
        let values = self.values(col, 2, "differentiation")?;
        let base = seconds(self.interval()?);
        let index = self.series.index();

        let diffs = values
            .windows(2)
            .zip(index.windows(2))
            .map(|(v, t)| (v[1] - v[0]) / (seconds(t[1] - t[0]) / base))
            .collect();

        self.derived(&index[..index.len() - 1], DIFF, diffs)
    }

    /// Trailing moving average; never looks ahead.
    pub fn calc_movavg(&self, window: Window, col: &str) -> Result<DerivedSeries, SeriesError> {
        window.validate()?;
        let values = self.series.column(col)?;
        let index = self.series.index();

        let avgs = match window {
            Window::Count(k) => (0..values.len())
                .map(|i| mean(&values[(i + 1).saturating_sub(k)..=i]))
                .collect(),
            Window::Duration(d) => (0..values.len())
                .map(|i| {
                    let start = (0..=i)
                        .rev()
                        .take_while(|&j| index[i] - index[j] <= d)
                        .last()
                        .unwrap_or(i);
                    mean(&values[start..=i])
                })
                .collect(),
        };

        self.derived(index, MOVING_AVG, avgs)
    }

    /// Lag sweep: for lag `l` in `0..n-1`, correlate `v[l..]` with `v[..n-l]`.
    ///
    /// `(mean(x*y) - mean(x)*mean(y)) / (std(x) * std(y))`, population std.
    /// A lag where either segment is constant yields NaN. Position `l` of the
    /// result carries lag `l`.
    pub fn calc_autocor(&self, col: &str) -> Result<DerivedSeries, SeriesError> {
        let values = self.values(col, 2, "autocorrelation")?;
        let n = values.len();

        let autocor = (0..n - 1)
            .map(|lag| {
                let x = &values[lag..];
                let y = &values[..n - lag];

                if is_constant(x) || is_constant(y) {
                    return f64::NAN;
                }

                let xy: Vec<f64> = x.iter().zip(y).map(|(a, b)| a * b).collect();
                (mean(&xy) - mean(x) * mean(y)) / (std(x) * std(y))
            })
            .collect();

        self.derived(&self.series.index()[..n - 1], AUTOCOR, autocor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 9, d, 0, 0, 0).unwrap()
    }

    fn series(values: &[f64]) -> TimeSeries {
        let index = (1..=values.len() as u32).map(day).collect();
        TimeSeries::single("Datetime", index, "Open", values.to_vec()).unwrap()
    }

    fn one_to_nine() -> TimeSeries {
        series(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0])
    }

    #[test]
    fn global_extremes_of_ascending_series() {
        let s = one_to_nine();
        let a = Analyser::new(&s);

        let min = a.find_min("Open").unwrap();
        assert_eq!((min.ts, min.value, min.kind), (day(1), 1.0, ExtremeKind::Min));

        let max = a.find_max("Open").unwrap();
        assert_eq!((max.ts, max.value, max.kind), (day(9), 9.0, ExtremeKind::Max));

        let set = a.find_extremes("Open", ExtremeScope::Global).unwrap();
        let values: Vec<f64> = set.iter().map(|e| e.value).collect();
        assert_eq!(values, vec![1.0, 9.0]);
    }

    #[test]
    fn global_ties_resolve_to_first_occurrence() {
        let s = series(&[3.0, 1.0, 5.0, 1.0, 5.0]);
        let a = Analyser::new(&s);

        assert_eq!(a.find_min("Open").unwrap().ts, day(2));
        assert_eq!(a.find_max("Open").unwrap().ts, day(3));
    }

    #[test]
    fn monotone_series_has_no_local_extremes() {
        let s = one_to_nine();
        let set = Analyser::new(&s)
            .find_extremes("Open", ExtremeScope::Local)
            .unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn local_extremes_skip_endpoints() {
        let s = series(&[5.0, 1.0, 4.0, 2.0, 8.0]);
        let set = Analyser::new(&s)
            .find_extremes("Open", ExtremeScope::Local)
            .unwrap();

        let got: Vec<(DateTime<Utc>, ExtremeKind)> = set.iter().map(|e| (e.ts, e.kind)).collect();
        assert_eq!(
            got,
            vec![
                (day(2), ExtremeKind::Min),
                (day(3), ExtremeKind::Max),
                (day(4), ExtremeKind::Min),
            ]
        );
        assert_eq!(set.of_kind(ExtremeKind::Min).count(), 2);
    }

    #[test]
    fn flat_plateau_is_reported_as_min() {
        let s = series(&[2.0, 2.0, 2.0]);
        let set = Analyser::new(&s)
            .find_extremes("Open", ExtremeScope::Local)
            .unwrap();

        assert_eq!(set.len(), 1);
        assert_eq!(set.as_slice()[0].kind, ExtremeKind::Min);
    }

    #[test]
    fn short_series_has_no_local_extremes() {
        let s = series(&[1.0, 2.0]);
        let set = Analyser::new(&s)
            .find_extremes("Open", ExtremeScope::Local)
            .unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn extrema_of_empty_series_is_invalid() {
        let s = TimeSeries::single("Datetime", vec![], "Open", vec![]).unwrap();
        let err = Analyser::new(&s).find_min("Open").unwrap_err();
        assert!(matches!(err, SeriesError::InvalidArgument(_)));
    }

    #[test]
    fn unknown_column_is_not_found_everywhere() {
        let s = one_to_nine();
        let a = Analyser::new(&s);
        let nf = SeriesError::NotFound("Close".into());

        assert_eq!(a.find_min("Close").unwrap_err(), nf);
        assert_eq!(a.find_extremes("Close", ExtremeScope::Local).unwrap_err(), nf);
        assert_eq!(a.differentiate("Close").unwrap_err(), nf);
        assert_eq!(a.calc_movavg(Window::Count(3), "Close").unwrap_err(), nf);
        assert_eq!(a.calc_autocor("Close").unwrap_err(), nf);
    }

    #[test]
    fn differentiate_unit_spacing() {
        let s = one_to_nine();
        let diff = Analyser::new(&s).differentiate("Open").unwrap();

        assert_eq!(diff.name(), DIFF);
        assert_eq!(diff.len(), 8);
        assert!(diff.values().iter().all(|v| *v == 1.0));
        assert_eq!(diff.values().iter().sum::<f64>(), 8.0);
        assert_eq!(diff.index().first(), Some(&day(1)));
        assert_eq!(diff.index().last(), Some(&day(8)));
    }

    #[test]
    fn differentiate_normalises_by_base_interval() {
        // gaps of 1, 2 and 1 days; base interval derives to 1 day
        let index = vec![day(1), day(2), day(4), day(5)];
        let s = TimeSeries::single("Datetime", index, "Open", vec![0.0, 1.0, 5.0, 6.0]).unwrap();

        let diff = Analyser::new(&s).differentiate("Open").unwrap();
        assert_eq!(diff.values(), &[1.0, 2.0, 1.0]);

        let half_days = Analyser::with_interval(&s, TimeDelta::hours(12)).unwrap();
        assert_eq!(half_days.differentiate("Open").unwrap().values(), &[0.5, 1.0, 0.5]);
    }

    #[test]
    fn differentiate_needs_two_rows() {
        let s = series(&[1.0]);
        let err = Analyser::new(&s).differentiate("Open").unwrap_err();
        assert!(matches!(err, SeriesError::InvalidArgument(_)));
    }

    #[test]
    fn non_positive_base_interval_is_rejected() {
        let s = one_to_nine();
        assert!(Analyser::with_interval(&s, TimeDelta::zero()).is_err());
        assert!(Analyser::with_interval(&s, TimeDelta::seconds(-5)).is_err());
    }

    #[test]
    fn count_window_moving_average() {
        let s = one_to_nine();
        let avg = Analyser::new(&s).calc_movavg(Window::Count(4), "Open").unwrap();

        assert_eq!(avg.name(), MOVING_AVG);
        assert_eq!(avg.len(), 9);
        assert_eq!(avg.values()[4], 3.5);
        // shorter window near the start
        assert_eq!(avg.values()[0], 1.0);
        assert_eq!(avg.values()[1], 1.5);
        assert_eq!(avg.index(), s.index());
    }

    #[test]
    fn count_window_below_one_is_invalid() {
        let s = one_to_nine();
        let err = Analyser::new(&s).calc_movavg(Window::Count(0), "Open").unwrap_err();
        assert!(matches!(err, SeriesError::InvalidArgument(_)));
    }

    #[test]
    fn duration_window_matches_count_window_on_uniform_spacing() {
        let s = one_to_nine();
        let a = Analyser::new(&s);

        let by_time = a.calc_movavg(Window::Duration(TimeDelta::days(3)), "Open").unwrap();
        let by_count = a.calc_movavg(Window::Count(4), "Open").unwrap();

        assert_eq!(by_time.values()[4], 3.5);
        assert_eq!(by_time.values(), by_count.values());
    }

    #[test]
    fn duration_window_respects_gaps() {
        let index = vec![day(1), day(2), day(6), day(7)];
        let s = TimeSeries::single("Datetime", index, "Open", vec![10.0, 20.0, 30.0, 40.0]).unwrap();

        let avg = Analyser::new(&s)
            .calc_movavg(Window::Duration(TimeDelta::days(2)), "Open")
            .unwrap();

        assert_eq!(avg.values(), &[10.0, 15.0, 30.0, 35.0]);
    }

    #[test]
    fn zero_duration_window_is_identity() {
        let s = one_to_nine();
        let avg = Analyser::new(&s)
            .calc_movavg(Window::Duration(TimeDelta::zero()), "Open")
            .unwrap();
        assert_eq!(avg.values(), s.column("Open").unwrap());
    }

    #[test]
    fn autocorrelation_of_linear_series_is_one() {
        let s = one_to_nine();
        let ac = Analyser::new(&s).calc_autocor("Open").unwrap();

        assert_eq!(ac.name(), AUTOCOR);
        assert_eq!(ac.len(), 8);
        assert_eq!(ac.index(), &s.index()[..8]);
        for v in ac.values() {
            assert!(v.is_finite());
            assert!((v - 1.0).abs() < 1e-9, "expected ~1, got {v}");
        }
    }

    #[test]
    fn autocorrelation_detects_alternation() {
        let s = series(&[1.0, -1.0, 1.0, -1.0, 1.0, -1.0]);
        let ac = Analyser::new(&s).calc_autocor("Open").unwrap();

        assert!((ac.values()[0] - 1.0).abs() < 1e-9);
        assert!((ac.values()[1] + 1.0).abs() < 1e-9);
    }

    #[test]
    fn constant_segment_yields_nan() {
        let s = series(&[4.0, 4.0, 4.0, 4.0]);
        let ac = Analyser::new(&s).calc_autocor("Open").unwrap();
        assert!(ac.values().iter().all(|v| v.is_nan()));

        // only the last lag compares two equal points
        let s = series(&[1.0, 3.0, 2.0, 5.0, 5.0]);
        let ac = Analyser::new(&s).calc_autocor("Open").unwrap();
        assert!(ac.values()[..3].iter().all(|v| v.is_finite()));
        assert!(ac.values()[3].is_nan());
    }

    #[test]
    fn autocorrelation_needs_two_rows() {
        let s = series(&[1.0]);
        let err = Analyser::new(&s).calc_autocor("Open").unwrap_err();
        assert!(matches!(err, SeriesError::InvalidArgument(_)));
    }

    #[test]
    fn derived_series_chain_like_the_observer() {
        let s = one_to_nine();
        let avg = Analyser::new(&s).calc_movavg(Window::Count(3), "Open").unwrap();

        let on_avg = Analyser::with_interval(avg.as_series(), TimeDelta::days(1)).unwrap();
        let diff = on_avg.differentiate(MOVING_AVG).unwrap();
        let ac = on_avg.calc_autocor(MOVING_AVG).unwrap();

        assert_eq!(diff.last(), Some((day(8), 1.0)));
        assert_eq!(ac.last().map(|(ts, _)| ts), Some(day(8)));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn uniform(values: Vec<f64>) -> TimeSeries {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let index = (0..values.len() as i64)
            .map(|i| start + TimeDelta::minutes(i))
            .collect();
        TimeSeries::single("Datetime", index, "Open", values).unwrap()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]
        #[test]
        fn moving_average_stays_within_its_window(
            values in prop::collection::vec(-1_000.0..1_000.0f64, 1..60),
            k in 1usize..10,
        ) {
            let s = uniform(values.clone());
            let avg = Analyser::new(&s).calc_movavg(Window::Count(k), "Open").unwrap();

            prop_assert_eq!(avg.len(), values.len());
            for (i, a) in avg.values().iter().enumerate() {
                let w = &values[(i + 1).saturating_sub(k)..=i];
                let lo = w.iter().cloned().fold(f64::INFINITY, f64::min);
                let hi = w.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
                prop_assert!(*a >= lo - 1e-9 && *a <= hi + 1e-9);
            }
        }

        #[test]
        fn duration_and_count_windows_agree_on_uniform_spacing(
            values in prop::collection::vec(-1_000.0..1_000.0f64, 1..60),
            k in 1usize..10,
        ) {
            let s = uniform(values);
            let a = Analyser::new(&s);

            let by_count = a.calc_movavg(Window::Count(k), "Open").unwrap();
            let by_time = a
                .calc_movavg(Window::Duration(TimeDelta::minutes(k as i64 - 1)), "Open")
                .unwrap();

            prop_assert_eq!(by_count.values(), by_time.values());
        }

        #[test]
        fn differential_on_uniform_spacing_is_plain_difference(
            values in prop::collection::vec(-1_000.0..1_000.0f64, 2..60),
        ) {
            let s = uniform(values.clone());
            let diff = Analyser::new(&s).differentiate("Open").unwrap();

            prop_assert_eq!(diff.len(), values.len() - 1);
            for (i, d) in diff.values().iter().enumerate() {
                prop_assert_eq!(*d, values[i + 1] - values[i]);
            }
        }

        #[test]
        fn local_extremes_are_interior_turning_points(
            values in prop::collection::vec(-50i32..50, 0..40),
        ) {
            let values: Vec<f64> = values.into_iter().map(f64::from).collect();
            let s = uniform(values.clone());
            let set = Analyser::new(&s).find_extremes("Open", ExtremeScope::Local);

            if values.is_empty() {
                prop_assert!(set.is_err());
                return Ok(());
            }

            for e in set.unwrap().iter() {
                let i = s.index().iter().position(|t| *t == e.ts).unwrap();
                prop_assert!(i > 0 && i + 1 < values.len());
                match e.kind {
                    ExtremeKind::Min => {
                        prop_assert!(values[i] <= values[i - 1] && values[i] <= values[i + 1]);
                    }
                    ExtremeKind::Max => {
                        prop_assert!(values[i] >= values[i - 1] && values[i] >= values[i + 1]);
                        prop_assert!(!(values[i] <= values[i - 1] && values[i] <= values[i + 1]));
                    }
                }
            }
        }

        #[test]
        fn autocorrelation_is_bounded_or_nan(
            values in prop::collection::vec(-100i32..100, 2..40),
        ) {
            let values: Vec<f64> = values.into_iter().map(f64::from).collect();
            let s = uniform(values);
            let ac = Analyser::new(&s).calc_autocor("Open").unwrap();

            for v in ac.values() {
                prop_assert!(v.is_nan() || v.abs() <= 1.0 + 1e-6);
            }
        }
    }
}
