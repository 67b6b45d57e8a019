//! Small slice statistics (population moments, like numpy defaults).

use chrono::TimeDelta;

pub(crate) fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (ddof = 0).
pub(crate) fn std(values: &[f64]) -> f64 {
    let m = mean(values);
    let var = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

/// True when every element equals the first; an empty slice counts as constant.
pub(crate) fn is_constant(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] == w[1])
}

pub(crate) fn seconds(d: TimeDelta) -> f64 {
    d.num_seconds() as f64 + f64::from(d.subsec_nanos()) * 1e-9
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn population_moments() {
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(mean(&v), 5.0);
        assert_eq!(std(&v), 2.0);
    }

    #[test]
    fn constant_detection_is_exact() {
        assert!(is_constant(&[0.1, 0.1, 0.1]));
        assert!(!is_constant(&[0.1, 0.1, 0.1000001]));
    }

    #[test]
    fn fractional_seconds() {
        assert_eq!(seconds(TimeDelta::milliseconds(1_500)), 1.5);
        assert_eq!(seconds(TimeDelta::days(1)), 86_400.0);
    }
}
