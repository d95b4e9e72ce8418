use crate::{error::DataError, rest::RestClient};
use serde_json::Value;

/// Kraken public REST API base URL.
pub const REST_BASE_URL: &str = "https://api.kraken.com/0/public/";

/// OHLC interval values accepted by Kraken, in minutes.
pub const OHLC_INTERVALS: [u32; 9] = [1, 5, 15, 30, 60, 240, 1440, 10080, 21600];

/// Default OHLC interval, in minutes.
pub const DEFAULT_OHLC_INTERVAL: u32 = 60;

/// Default order-book depth.
pub const DEFAULT_BOOK_COUNT: u32 = 100;

/// Default recent-trades count.
pub const DEFAULT_TRADE_COUNT: u32 = 1000;

/// Client for the Kraken public REST API.
///
/// Every endpoint returns the decoded JSON body verbatim; Kraken wraps all
/// responses in `{ "error": [...], "result": {...} }` and that envelope is
/// passed through untouched.
#[derive(Debug, Clone)]
pub struct KrakenClient {
    rest: RestClient,
}

impl KrakenClient {
    pub fn new() -> Result<Self, DataError> {
        Self::with_base_url(REST_BASE_URL)
    }

    /// Construct a client against a custom base URL, e.g. a mock server.
    pub fn with_base_url(base_url: &str) -> Result<Self, DataError> {
        Ok(Self {
            rest: RestClient::new(base_url)?,
        })
    }

    /// Current system status or trading mode.
    pub async fn system_status(&self) -> Result<Value, DataError> {
        self.rest.get("SystemStatus", &[]).await
    }

    /// Current server time.
    pub async fn server_time(&self) -> Result<Value, DataError> {
        self.rest.get("Time", &[]).await
    }

    /// Information about the assets available for trading.
    pub async fn asset_info(&self, asset: Option<&str>) -> Result<Value, DataError> {
        let mut params = vec![("aclass", "currency".to_string())];
        if let Some(asset) = asset {
            params.push(("asset", asset.to_string()));
        }
        self.rest.get("Assets", &params).await
    }

    /// Tradable asset pairs.
    pub async fn tradable_asset_pairs(&self, pair: Option<&str>) -> Result<Value, DataError> {
        let mut params = Vec::new();
        if let Some(pair) = pair {
            params.push(("pair", pair.to_string()));
        }
        self.rest.get("AssetPairs", &params).await
    }

    /// Ticker information for all pairs, or one pair.
    pub async fn ticker_information(&self, pair: Option<&str>) -> Result<Value, DataError> {
        let mut params = Vec::new();
        if let Some(pair) = pair {
            params.push(("pair", pair.to_string()));
        }
        self.rest.get("Ticker", &params).await
    }

    /// OHLC (candle) data.
    ///
    /// `interval` is in minutes and must be one of [`OHLC_INTERVALS`];
    /// `since` returns committed data since the given unix timestamp.
    pub async fn ohlc_data(
        &self,
        pair: Option<&str>,
        interval: u32,
        since: Option<i64>,
    ) -> Result<Value, DataError> {
        if !OHLC_INTERVALS.contains(&interval) {
            return Err(DataError::InvalidArgument(format!(
                "invalid interval: {interval}. Supported intervals: {OHLC_INTERVALS:?}"
            )));
        }

        let mut params = Vec::new();
        if let Some(pair) = pair {
            params.push(("pair", pair.to_string()));
        }
        params.push(("interval", interval.to_string()));
        if let Some(since) = since {
            params.push(("since", since.to_string()));
        }
        self.rest.get("OHLC", &params).await
    }

    /// Order book for a pair. `count` bounds the number of entries per side
    /// and must be within 1..=500.
    pub async fn order_book(&self, pair: &str, count: u32) -> Result<Value, DataError> {
        if !(1..=500).contains(&count) {
            return Err(DataError::InvalidArgument(format!(
                "invalid count: {count}. Supported counts: 1-500"
            )));
        }

        self.rest
            .get(
                "Depth",
                &[("pair", pair.to_string()), ("count", count.to_string())],
            )
            .await
    }

    /// Most recent trades for a pair. `count` must be within 1..=1000.
    pub async fn recent_trades(
        &self,
        pair: &str,
        count: u32,
        since: Option<i64>,
    ) -> Result<Value, DataError> {
        if !(1..=1000).contains(&count) {
            return Err(DataError::InvalidArgument(format!(
                "invalid count: {count}. Supported counts: 1-1000"
            )));
        }

        let mut params = vec![("pair", pair.to_string()), ("count", count.to_string())];
        if let Some(since) = since {
            params.push(("since", since.to_string()));
        }
        self.rest.get("Trades", &params).await
    }

    /// Most recent spread data for a pair.
    pub async fn recent_spreads(&self, pair: &str, since: Option<i64>) -> Result<Value, DataError> {
        let mut params = vec![("pair", pair.to_string())];
        if let Some(since) = since {
            params.push(("since", since.to_string()));
        }
        self.rest.get("Spread", &params).await
    }
}
