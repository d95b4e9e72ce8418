use crate::error::DataError;
use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use std::{fmt, str::FromStr};

/// Supported interval units. Exchange-specific tokens the unit set cannot
/// express (e.g. Binance's `1M` month token) are validated against the
/// per-exchange allow-lists instead.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum IntervalUnit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
}

impl IntervalUnit {
    /// Compact suffix used in interval tokens (`"1h"`, `"15m"`, ...).
    pub fn suffix(&self) -> &'static str {
        match self {
            IntervalUnit::Second => "s",
            IntervalUnit::Minute => "m",
            IntervalUnit::Hour => "h",
            IntervalUnit::Day => "d",
            IntervalUnit::Week => "w",
        }
    }
}

/// A candle bar duration: a positive magnitude and a unit.
///
/// Round-trips through [`TimeDelta`] without loss for every supported
/// unit/magnitude pair:
/// `Interval::from_duration("1h".parse::<Interval>()?.duration())?`
/// displays as `"1h"` again.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Interval {
    pub amount: u32,
    pub unit: IntervalUnit,
}

impl Interval {
    pub const fn new(amount: u32, unit: IntervalUnit) -> Self {
        Self { amount, unit }
    }

    /// The absolute duration this interval spans.
    pub fn duration(&self) -> TimeDelta {
        let amount = i64::from(self.amount);
        match self.unit {
            IntervalUnit::Second => TimeDelta::seconds(amount),
            IntervalUnit::Minute => TimeDelta::minutes(amount),
            IntervalUnit::Hour => TimeDelta::hours(amount),
            IntervalUnit::Day => TimeDelta::days(amount),
            IntervalUnit::Week => TimeDelta::weeks(amount),
        }
    }

    /// Express a duration as an interval in the largest whole unit:
    /// below a minute in seconds, below an hour in minutes, below a day in
    /// hours, below a week in days, otherwise weeks.
    ///
    /// Fails for durations that no interval can express: zero or negative,
    /// or more weeks than the magnitude can hold.
    pub fn from_duration(duration: TimeDelta) -> Result<Self, DataError> {
        let seconds = duration.num_seconds();
        if seconds <= 0 {
            return Err(DataError::InvalidArgument(format!(
                "cannot express non-positive duration of {seconds}s as an interval"
            )));
        }

        let interval = if seconds < 60 {
            Self::new(seconds as u32, IntervalUnit::Second)
        } else if seconds < 60 * 60 {
            Self::new((seconds / 60) as u32, IntervalUnit::Minute)
        } else if seconds < 60 * 60 * 24 {
            Self::new((seconds / (60 * 60)) as u32, IntervalUnit::Hour)
        } else if seconds < 60 * 60 * 24 * 7 {
            Self::new((seconds / (60 * 60 * 24)) as u32, IntervalUnit::Day)
        } else {
            let weeks = u32::try_from(seconds / (60 * 60 * 24 * 7)).map_err(|_| {
                DataError::InvalidArgument(format!(
                    "duration of {seconds}s is too large for an interval"
                ))
            })?;
            Self::new(weeks, IntervalUnit::Week)
        };

        Ok(interval)
    }
}

impl FromStr for Interval {
    type Err = DataError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let digits: String = token.chars().filter(|c| c.is_ascii_digit()).collect();
        let alpha: String = token.chars().filter(|c| c.is_ascii_alphabetic()).collect();

        let amount: u32 = digits
            .parse()
            .map_err(|_| DataError::InvalidArgument(format!("invalid interval token: '{token}'")))?;
        if amount == 0 {
            return Err(DataError::InvalidArgument(format!(
                "invalid interval token: '{token}'"
            )));
        }

        let unit = match alpha.as_str() {
            "s" | "sec" | "second" | "seconds" => IntervalUnit::Second,
            "m" | "min" | "minute" | "minutes" => IntervalUnit::Minute,
            "h" | "hr" | "hour" | "hours" => IntervalUnit::Hour,
            "d" | "day" | "days" => IntervalUnit::Day,
            "w" | "week" | "weeks" => IntervalUnit::Week,
            _ => {
                return Err(DataError::InvalidArgument(format!(
                    "unsupported interval unit: '{alpha}'"
                )));
            }
        };

        Ok(Self { amount, unit })
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.unit.suffix())
    }
}

/// Parse a `"%Y-%m-%d %H:%M:%S"` calendar string as a UTC timestamp.
pub fn parse_utc_datetime(datetime_str: &str) -> Result<DateTime<Utc>, DataError> {
    NaiveDateTime::parse_from_str(datetime_str, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| DataError::InvalidArgument(format!("invalid datetime '{datetime_str}': {e}")))
}
