use crate::{
    candle::Candle,
    error::DataError,
    exchange::binance::{BinanceClient, KlineQuery},
    interval::Interval,
    timeframe::generate_timeframes,
};
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use std::{collections::BTreeMap, path::Path, time::Duration};
use tokio::time::sleep;
use tracing::{info, warn};

/// Page size used when chunking a backfill or update into requests.
pub const PAGE_LIMIT: u32 = 500;

/// Persist a candle table as a delimited file with a header row; the first
/// column is the RFC 3339 open time.
pub fn save_history(path: &Path, candles: &[Candle]) -> Result<(), DataError> {
    let mut writer = csv::Writer::from_path(path)?;
    for candle in candles {
        writer.serialize(candle)?;
    }
    writer.flush()?;
    Ok(())
}

/// Reload a candle table persisted by [`save_history`].
pub fn load_history(path: &Path) -> Result<Vec<Candle>, DataError> {
    let mut reader = csv::Reader::from_path(path)?;
    reader
        .deserialize()
        .collect::<Result<Vec<Candle>, _>>()
        .map_err(DataError::from)
}

/// Sanity-check a candle table: warn on unsorted rows, duplicate open times,
/// and gaps larger than the spacing inferred from the first two rows. Gaps
/// at genuine market-data outages are expected, hence warnings not errors.
/// Returns the number of problems logged.
pub fn check_history(candles: &[Candle]) -> usize {
    if candles.len() < 2 {
        return 0;
    }

    let mut problems = 0;
    let spacing = candles[1].open_time - candles[0].open_time;
    for (index, pair) in candles.windows(2).enumerate() {
        let step = pair[1].open_time - pair[0].open_time;
        if step <= TimeDelta::zero() {
            warn!(
                position = index + 1,
                open_time = %pair[1].open_time,
                "history is not sorted by open time or contains duplicate keys"
            );
            problems += 1;
        } else if spacing > TimeDelta::zero() && step > spacing {
            warn!(
                after = %pair[0].open_time,
                before = %pair[1].open_time,
                "history is missing entries"
            );
            problems += 1;
        }
    }

    problems
}

/// Fetch a full calendar year of klines: Jan 1 00:00:00 through
/// Dec 31 23:00:00 UTC, chunked into [`PAGE_LIMIT`]-bar windows, with a
/// fixed `delay` slept between requests as the sole rate-limit strategy.
/// The first fetch error aborts the remaining windows.
pub async fn backfill_year(
    client: &BinanceClient,
    symbol: &str,
    interval: &str,
    year: i32,
    delay: Duration,
) -> Result<Vec<Candle>, DataError> {
    let start = year_timestamp(year, 1, 1, 0)?;
    let end = year_timestamp(year, 12, 31, 23)?;
    fetch_range(client, symbol, interval, start, end, delay).await
}

/// Bring a persisted candle table up to date.
///
/// Loads the table at `path`, and if less than one interval has elapsed
/// since its last entry, logs and returns it unchanged. Otherwise fetches
/// the missing range in [`PAGE_LIMIT`]-bar windows (fixed `delay` between
/// requests), merges keeping the most recently fetched row on any open-time
/// collision, persists the merged table, and returns it. A fetch failure
/// aborts the whole update, leaving the persisted table untouched.
pub async fn update_history(
    client: &BinanceClient,
    path: &Path,
    symbol: &str,
    interval: &str,
    delay: Duration,
) -> Result<Vec<Candle>, DataError> {
    let history = load_history(path)?;
    let last = history.last().ok_or_else(|| {
        DataError::InvalidArgument(format!("history at {} is empty", path.display()))
    })?;

    let interval_duration = interval.parse::<Interval>()?.duration();
    let now = Utc::now();

    if now - last.open_time <= interval_duration {
        info!(symbol, interval, "data is up to date");
        return Ok(history);
    }

    info!(symbol, interval, "updating kline history");
    let fetched = fetch_range(client, symbol, interval, last.open_time, now, delay).await?;

    let merged = merge_candles(history, fetched);
    save_history(path, &merged)?;
    Ok(merged)
}

async fn fetch_range(
    client: &BinanceClient,
    symbol: &str,
    interval: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    delay: Duration,
) -> Result<Vec<Candle>, DataError> {
    let frames = generate_timeframes(start, end, interval, PAGE_LIMIT)?;

    let mut candles = Vec::new();
    for frame in frames {
        info!(
            symbol,
            interval,
            start = %frame.start,
            end = %frame.end,
            "downloading klines"
        );

        let query = KlineQuery {
            symbol: symbol.to_string(),
            interval: interval.to_string(),
            start: Some(frame.start),
            end: Some(frame.end),
            limit: PAGE_LIMIT,
            endpoint: Default::default(),
        };
        candles.extend(client.klines(&query).await?);

        sleep(delay).await;
    }

    Ok(candles)
}

/// Merge two row sets keyed by open time, keeping the later-inserted row on
/// any collision, ordered ascending.
fn merge_candles(existing: Vec<Candle>, fetched: Vec<Candle>) -> Vec<Candle> {
    let mut merged: BTreeMap<DateTime<Utc>, Candle> = BTreeMap::new();
    for candle in existing.into_iter().chain(fetched) {
        merged.insert(candle.open_time, candle);
    }
    merged.into_values().collect()
}

fn year_timestamp(year: i32, month: u32, day: u32, hour: u32) -> Result<DateTime<Utc>, DataError> {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0)
        .single()
        .ok_or_else(|| DataError::InvalidArgument(format!("invalid year: {year}")))
}
