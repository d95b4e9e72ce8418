use crate::{candle::Candle, de::extract_next, error::DataError};
use chrono::DateTime;

/// Kline interval tokens accepted by the Binance REST and stream APIs.
pub const KLINE_INTERVALS: [&str; 16] = [
    "1s", "1m", "3m", "5m", "15m", "30m", "1h", "2h", "4h", "6h", "8h", "12h", "1d", "3d", "1w",
    "1M",
];

/// Validate an interval token against the Binance allow-list.
pub fn validate_interval(interval: &str) -> Result<(), DataError> {
    if KLINE_INTERVALS.contains(&interval) {
        Ok(())
    } else {
        Err(DataError::InvalidArgument(format!(
            "invalid interval: '{interval}'. Supported intervals: {KLINE_INTERVALS:?}"
        )))
    }
}

/// Raw kline returned by the Binance REST API.
///
/// Binance returns klines as positional arrays of mixed types:
/// `[open_time, open, high, low, close, volume, close_time, quote_volume,
///   trade_count, taker_buy_volume, taker_buy_quote_volume, ignore]`
///
/// Decoded with a sequence visitor; the trailing "ignore" member is dropped.
#[derive(Debug, Clone)]
pub struct BinanceKlineRaw {
    pub open_time: i64,
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
    pub volume: String,
    pub close_time: i64,
    pub quote_volume: String,
    pub trade_count: u64,
    pub taker_buy_volume: String,
    pub taker_buy_quote_volume: String,
}

impl<'de> serde::Deserialize<'de> for BinanceKlineRaw {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::de::Deserializer<'de>,
    {
        struct BinanceKlineVisitor;

        impl<'de> serde::de::Visitor<'de> for BinanceKlineVisitor {
            type Value = BinanceKlineRaw;

            fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                formatter.write_str("a Binance kline array with at least 11 elements")
            }

            fn visit_seq<SeqAccessor>(
                self,
                mut seq: SeqAccessor,
            ) -> Result<Self::Value, SeqAccessor::Error>
            where
                SeqAccessor: serde::de::SeqAccess<'de>,
            {
                let open_time = extract_next(&mut seq, "open_time")?;
                let open = extract_next(&mut seq, "open")?;
                let high = extract_next(&mut seq, "high")?;
                let low = extract_next(&mut seq, "low")?;
                let close = extract_next(&mut seq, "close")?;
                let volume = extract_next(&mut seq, "volume")?;
                let close_time = extract_next(&mut seq, "close_time")?;
                let quote_volume = extract_next(&mut seq, "quote_volume")?;
                let trade_count = extract_next(&mut seq, "trade_count")?;
                let taker_buy_volume = extract_next(&mut seq, "taker_buy_volume")?;
                let taker_buy_quote_volume = extract_next(&mut seq, "taker_buy_quote_volume")?;

                // Drain the trailing "ignore" member (and anything after it)
                while seq.next_element::<serde::de::IgnoredAny>()?.is_some() {}

                Ok(BinanceKlineRaw {
                    open_time,
                    open,
                    high,
                    low,
                    close,
                    volume,
                    close_time,
                    quote_volume,
                    trade_count,
                    taker_buy_volume,
                    taker_buy_quote_volume,
                })
            }
        }

        deserializer.deserialize_seq(BinanceKlineVisitor)
    }
}

fn parse_price(field: &'static str, value: &str) -> Result<f64, String> {
    value
        .parse::<f64>()
        .map_err(|e| format!("failed to parse {field} '{value}': {e}"))
}

impl TryFrom<BinanceKlineRaw> for Candle {
    type Error = String;

    fn try_from(raw: BinanceKlineRaw) -> Result<Self, Self::Error> {
        let open_time = DateTime::from_timestamp_millis(raw.open_time)
            .ok_or_else(|| format!("invalid open_time millis: {}", raw.open_time))?;

        let close_time = DateTime::from_timestamp_millis(raw.close_time)
            .ok_or_else(|| format!("invalid close_time millis: {}", raw.close_time))?;

        Ok(Candle {
            open_time,
            open: parse_price("open", &raw.open)?,
            high: parse_price("high", &raw.high)?,
            low: parse_price("low", &raw.low)?,
            close: parse_price("close", &raw.close)?,
            volume: parse_price("volume", &raw.volume)?,
            close_time,
            quote_volume: parse_price("quote_volume", &raw.quote_volume)?,
            trade_count: raw.trade_count,
            taker_buy_volume: parse_price("taker_buy_volume", &raw.taker_buy_volume)?,
            taker_buy_quote_volume: parse_price(
                "taker_buy_quote_volume",
                &raw.taker_buy_quote_volume,
            )?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_interval() {
        for interval in KLINE_INTERVALS {
            assert!(validate_interval(interval).is_ok());
        }
        assert!(validate_interval("7m").is_err());
        assert!(validate_interval("1x").is_err());
    }

    #[test]
    fn test_deserialize_binance_kline_raw() {
        let json = r#"[
            1499040000000,
            "0.01634000",
            "0.80000000",
            "0.01575800",
            "0.01577100",
            "148976.11427815",
            1499644799999,
            "2434.19055334",
            308,
            "1.20000000",
            "3.40000000",
            "0"
        ]"#;

        let raw: BinanceKlineRaw = serde_json::from_str(json).unwrap();
        assert_eq!(raw.open_time, 1499040000000);
        assert_eq!(raw.open, "0.01634000");
        assert_eq!(raw.close_time, 1499644799999);
        assert_eq!(raw.quote_volume, "2434.19055334");
        assert_eq!(raw.trade_count, 308);
        assert_eq!(raw.taker_buy_volume, "1.20000000");
        assert_eq!(raw.taker_buy_quote_volume, "3.40000000");
    }

    #[test]
    fn test_try_from_binance_kline_raw_for_candle() {
        let raw = BinanceKlineRaw {
            open_time: 1499040000000,
            open: "0.01634000".to_string(),
            high: "0.80000000".to_string(),
            low: "0.01575800".to_string(),
            close: "0.01577100".to_string(),
            volume: "148976.11427815".to_string(),
            close_time: 1499644799999,
            quote_volume: "2434.19055334".to_string(),
            trade_count: 308,
            taker_buy_volume: "1.20000000".to_string(),
            taker_buy_quote_volume: "3.40000000".to_string(),
        };

        let candle = Candle::try_from(raw).unwrap();

        assert_eq!(
            candle.open_time,
            DateTime::from_timestamp_millis(1499040000000).unwrap()
        );
        assert_eq!(
            candle.close_time,
            DateTime::from_timestamp_millis(1499644799999).unwrap()
        );
        assert!((candle.open - 0.01634).abs() < 1e-10);
        assert!((candle.high - 0.8).abs() < 1e-10);
        assert!((candle.low - 0.015758).abs() < 1e-10);
        assert!((candle.close - 0.015771).abs() < 1e-10);
        assert!((candle.volume - 148976.11427815).abs() < 1e-6);
        assert!((candle.quote_volume - 2434.19055334).abs() < 1e-6);
        assert_eq!(candle.trade_count, 308);
        assert!((candle.taker_buy_volume - 1.2).abs() < 1e-10);
    }

    #[test]
    fn test_try_from_binance_kline_raw_bad_price() {
        let raw = BinanceKlineRaw {
            open_time: 1499040000000,
            open: "garbage".to_string(),
            high: "0.8".to_string(),
            low: "0.01".to_string(),
            close: "0.02".to_string(),
            volume: "1.0".to_string(),
            close_time: 1499644799999,
            quote_volume: "1.0".to_string(),
            trade_count: 1,
            taker_buy_volume: "0.5".to_string(),
            taker_buy_quote_volume: "0.5".to_string(),
        };

        assert!(Candle::try_from(raw).is_err());
    }

    #[test]
    fn test_deserialize_binance_kline_vec() {
        let json = r#"[
            [1499040000000,"0.01634000","0.80000000","0.01575800","0.01577100","148976.11427815",1499644799999,"2434.19055334",308,"1.2","3.4","0"],
            [1499644800000,"0.01577100","0.01590000","0.01573000","0.01580000","100000.00000000",1500249599999,"1500.00000000",200,"0.5","1.0","0"]
        ]"#;

        let klines: Vec<BinanceKlineRaw> = serde_json::from_str(json).unwrap();
        assert_eq!(klines.len(), 2);
        assert_eq!(klines[0].open_time, 1499040000000);
        assert_eq!(klines[1].open_time, 1499644800000);
    }
}
