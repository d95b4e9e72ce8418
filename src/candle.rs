use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Normalised OHLCV candle row.
///
/// `open_time` is the natural unique key; tables of candles are ordered by
/// it ascending. Serializes to a flat record, so the same struct backs both
/// the typed kline responses and the CSV history rows.
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug, Deserialize, Serialize)]
pub struct Candle {
    pub open_time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub close_time: DateTime<Utc>,
    pub quote_volume: f64,
    pub trade_count: u64,
    pub taker_buy_volume: f64,
    pub taker_buy_quote_volume: f64,
}
