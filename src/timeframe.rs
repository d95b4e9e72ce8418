use crate::{error::DataError, interval::Interval};
use chrono::{DateTime, TimeDelta, Utc};

/// A single request window: `[start, end)` with `start < end`.
///
/// Windows produced by [`generate_timeframes`] are contiguous: each window's
/// `end` equals the next window's `start`, and the final window is clipped to
/// the overall end of the requested range.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct TimeFrame {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Partition `[start, end]` into contiguous, non-overlapping windows, each
/// spanning at most `limit` bars of `interval`.
///
/// Fails with [`DataError::InvalidArgument`] when the interval token is
/// unparseable, `start >= end`, or `limit == 0`.
pub fn generate_timeframes(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    interval: &str,
    limit: u32,
) -> Result<Vec<TimeFrame>, DataError> {
    if start >= end {
        return Err(DataError::InvalidArgument(format!(
            "start {start} must be before end {end}"
        )));
    }
    if limit == 0 {
        return Err(DataError::InvalidArgument(
            "limit must be positive".to_string(),
        ));
    }

    let bar = interval.parse::<Interval>()?;
    let span = bar
        .duration()
        .num_seconds()
        .checked_mul(i64::from(limit))
        .and_then(TimeDelta::try_seconds)
        .ok_or_else(|| {
            DataError::InvalidArgument(format!("window span overflows: {bar} * {limit} bars"))
        })?;

    let mut frames = Vec::new();
    let mut current = start;
    while current < end {
        let frame_end = std::cmp::min(current + span, end);
        frames.push(TimeFrame {
            start: current,
            end: frame_end,
        });
        current = frame_end;
    }

    Ok(frames)
}
