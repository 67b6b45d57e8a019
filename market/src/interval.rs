//! Sampling/poll interval strings such as `1m`, `5d` or `1mo`.
//!
//! The raw string is kept verbatim because the upstream API expects it; the
//! parsed length drives sleeping and differential normalisation.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::TimeDelta;

use crate::MarketError;

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Interval {
    raw: String,
    seconds: i64,
}

impl Interval {
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn seconds(&self) -> i64 {
        self.seconds
    }

    pub fn as_time_delta(&self) -> TimeDelta {
        // range checked at parse time
        TimeDelta::try_seconds(self.seconds).unwrap_or(TimeDelta::MAX)
    }

    pub fn as_std(&self) -> Duration {
        Duration::from_secs(self.seconds.unsigned_abs())
    }
}

impl FromStr for Interval {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let invalid = |why: &str| MarketError::InvalidArgument(format!("interval '{raw}': {why}"));

        // two-letter units first: "1mo" must not be read as minutes
        let (count, unit) = if let Some(n) = raw.strip_suffix("mo") {
            (n, 30 * DAY)
        } else if let Some(n) = raw.strip_suffix("wk") {
            (n, 7 * DAY)
        } else {
            let split = raw
                .char_indices()
                .last()
                .map(|(i, _)| i)
                .ok_or_else(|| invalid("empty"))?;
            let unit = match &raw[split..] {
                "s" => 1,
                "m" => MINUTE,
                "h" => HOUR,
                "d" => DAY,
                "w" => 7 * DAY,
                "y" => 365 * DAY,
                _ => return Err(invalid("unknown unit")),
            };
            (&raw[..split], unit)
        };

        let count: i64 = count.parse().map_err(|_| invalid("count is not a number"))?;
        if count <= 0 {
            return Err(invalid("must be positive"));
        }

        // chrono caps TimeDelta well below i64::MAX seconds
        let seconds = count
            .checked_mul(unit)
            .filter(|secs| TimeDelta::try_seconds(*secs).is_some())
            .ok_or_else(|| invalid("too large"))?;

        Ok(Self {
            raw: raw.to_string(),
            seconds,
        })
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: &str) -> i64 {
        s.parse::<Interval>().unwrap().seconds()
    }

    #[test]
    fn parses_every_unit() {
        assert_eq!(secs("30s"), 30);
        assert_eq!(secs("1m"), 60);
        assert_eq!(secs("60m"), 3_600);
        assert_eq!(secs("1h"), 3_600);
        assert_eq!(secs("5d"), 5 * 86_400);
        assert_eq!(secs("1w"), 7 * 86_400);
        assert_eq!(secs("1wk"), 7 * 86_400);
        assert_eq!(secs("3mo"), 90 * 86_400);
        assert_eq!(secs("1y"), 365 * 86_400);
    }

    #[test]
    fn keeps_raw_string_for_upstream() {
        let i: Interval = "1mo".parse().unwrap();
        assert_eq!(i.as_str(), "1mo");
        assert_eq!(i.to_string(), "1mo");
        assert_eq!(i.as_time_delta(), TimeDelta::days(30));
        assert_eq!(i.as_std(), Duration::from_secs(30 * 86_400));
    }

    #[test]
    fn malformed_strings_are_invalid_arguments() {
        for bad in ["", "m", "10", "5x", "-1m", "0s", "1.5h", "99999999999999999y"] {
            let err = bad.parse::<Interval>().unwrap_err();
            assert!(
                matches!(err, MarketError::InvalidArgument(_)),
                "{bad:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn lengths_chrono_cannot_hold_are_rejected() {
        // fits in i64 seconds, not in a TimeDelta
        let err = "9999999999999999s".parse::<Interval>().unwrap_err();
        assert!(matches!(err, MarketError::InvalidArgument(_)));

        let long = "300000y".parse::<Interval>().unwrap();
        assert_eq!(long.as_time_delta(), TimeDelta::days(300_000 * 365));
    }
}
