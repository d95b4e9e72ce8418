use crate::{
    candle::Candle,
    error::DataError,
    rest::{sign::signed_query, RestClient},
};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::{fmt, str::FromStr};
use tracing::debug;

/// Binance kline DTOs and interval allow-list.
pub mod klines;

/// Binance market-data WebSocket listeners.
pub mod stream;

/// Binance spot REST API base URL.
pub const REST_BASE_URL: &str = "https://api.binance.com/api/v3/";

/// Ticker statistics response flavour.
///
/// `Mini` omits the bid/ask and weighted-average fields of `Full`.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum TickerType {
    Full,
    #[default]
    Mini,
}

impl TickerType {
    /// Query-parameter value for this ticker type.
    pub fn as_str(&self) -> &'static str {
        match self {
            TickerType::Full => "FULL",
            TickerType::Mini => "MINI",
        }
    }
}

impl FromStr for TickerType {
    type Err = DataError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "FULL" => Ok(TickerType::Full),
            "MINI" => Ok(TickerType::Mini),
            other => Err(DataError::InvalidArgument(format!(
                "invalid type: '{other}'. Supported types: FULL, MINI"
            ))),
        }
    }
}

impl fmt::Display for TickerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which Binance klines endpoint to hit. `UiKlines` returns data optimised
/// for chart rendering; the request and response shapes are identical.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum KlineEndpoint {
    #[default]
    Klines,
    UiKlines,
}

impl KlineEndpoint {
    fn path(&self) -> &'static str {
        match self {
            KlineEndpoint::Klines => "klines",
            KlineEndpoint::UiKlines => "uiKlines",
        }
    }
}

/// Request parameters for [`BinanceClient::klines`].
#[derive(Clone, Debug)]
pub struct KlineQuery {
    pub symbol: String,
    /// Interval token, validated against [`klines::KLINE_INTERVALS`].
    pub interval: String,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    /// Bars per request, 1..=1000.
    pub limit: u32,
    pub endpoint: KlineEndpoint,
}

impl KlineQuery {
    pub fn new(symbol: impl Into<String>, interval: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            interval: interval.into(),
            start: None,
            end: None,
            limit: 500,
            endpoint: KlineEndpoint::Klines,
        }
    }
}

/// Client for the Binance spot public REST API.
///
/// Pass-through endpoints return the decoded JSON body verbatim as a
/// [`Value`]; only [`klines`](Self::klines) imposes a typed row shape.
#[derive(Debug, Clone)]
pub struct BinanceClient {
    rest: RestClient,
}

impl BinanceClient {
    pub fn new() -> Result<Self, DataError> {
        Self::with_base_url(REST_BASE_URL)
    }

    /// Construct a client against a custom base URL, e.g. a mock server.
    pub fn with_base_url(base_url: &str) -> Result<Self, DataError> {
        Ok(Self {
            rest: RestClient::new(base_url)?,
        })
    }

    /// Test connectivity to the REST API.
    pub async fn ping(&self) -> Result<Value, DataError> {
        self.rest.get("ping", &[]).await
    }

    /// Test connectivity and get the current server time.
    pub async fn server_time(&self) -> Result<Value, DataError> {
        self.rest.get("time", &[]).await
    }

    /// Current average price for a symbol.
    pub async fn average_price(&self, symbol: &str) -> Result<Value, DataError> {
        self.rest
            .get("avgPrice", &[("symbol", symbol.to_string())])
            .await
    }

    /// Current exchange trading rules and symbol information.
    pub async fn exchange_info(&self) -> Result<Value, DataError> {
        self.rest.get("exchangeInfo", &[]).await
    }

    /// Exchange trading rules and information for one symbol.
    pub async fn exchange_info_for_symbol(&self, symbol: &str) -> Result<Value, DataError> {
        self.rest
            .get("exchangeInfo", &[("symbol", symbol.to_string())])
            .await
    }

    /// Exchange trading rules and information for several symbols.
    pub async fn exchange_info_for_symbols(&self, symbols: &[&str]) -> Result<Value, DataError> {
        self.rest
            .get("exchangeInfo", &[("symbols", symbols_param(symbols))])
            .await
    }

    /// 24-hour rolling window price change statistics for all symbols.
    pub async fn ticker_24hr(&self, ticker_type: TickerType) -> Result<Value, DataError> {
        self.rest
            .get("ticker/24hr", &[("type", ticker_type.as_str().to_string())])
            .await
    }

    /// 24-hour rolling window price change statistics for one symbol.
    pub async fn ticker_24hr_for_symbol(
        &self,
        symbol: &str,
        ticker_type: TickerType,
    ) -> Result<Value, DataError> {
        self.rest
            .get(
                "ticker/24hr",
                &[
                    ("type", ticker_type.as_str().to_string()),
                    ("symbol", symbol.to_string()),
                ],
            )
            .await
    }

    /// 24-hour rolling window price change statistics for several symbols.
    pub async fn ticker_24hr_for_symbols(
        &self,
        symbols: &[&str],
        ticker_type: TickerType,
    ) -> Result<Value, DataError> {
        self.rest
            .get(
                "ticker/24hr",
                &[
                    ("type", ticker_type.as_str().to_string()),
                    ("symbols", symbols_param(symbols)),
                ],
            )
            .await
    }

    /// Price change statistics for the current trading day.
    pub async fn trading_day_ticker_for_symbol(
        &self,
        symbol: &str,
        ticker_type: TickerType,
    ) -> Result<Value, DataError> {
        self.rest
            .get(
                "ticker/tradingDay",
                &[
                    ("type", ticker_type.as_str().to_string()),
                    ("symbol", symbol.to_string()),
                ],
            )
            .await
    }

    /// Trading-day price change statistics for several symbols.
    pub async fn trading_day_ticker_for_symbols(
        &self,
        symbols: &[&str],
        ticker_type: TickerType,
    ) -> Result<Value, DataError> {
        self.rest
            .get(
                "ticker/tradingDay",
                &[
                    ("type", ticker_type.as_str().to_string()),
                    ("symbols", symbols_param(symbols)),
                ],
            )
            .await
    }

    /// Latest price for a symbol.
    pub async fn price_ticker_for_symbol(&self, symbol: &str) -> Result<Value, DataError> {
        self.rest
            .get("ticker/price", &[("symbol", symbol.to_string())])
            .await
    }

    /// Latest price for several symbols.
    pub async fn price_ticker_for_symbols(&self, symbols: &[&str]) -> Result<Value, DataError> {
        self.rest
            .get("ticker/price", &[("symbols", symbols_param(symbols))])
            .await
    }

    /// Best bid/ask price and quantity on the order book for a symbol.
    pub async fn book_ticker_for_symbol(&self, symbol: &str) -> Result<Value, DataError> {
        self.rest
            .get("ticker/bookTicker", &[("symbol", symbol.to_string())])
            .await
    }

    /// Best bid/ask price and quantity for several symbols.
    pub async fn book_ticker_for_symbols(&self, symbols: &[&str]) -> Result<Value, DataError> {
        self.rest
            .get("ticker/bookTicker", &[("symbols", symbols_param(symbols))])
            .await
    }

    /// Price change statistics over an arbitrary trailing window.
    ///
    /// `window_size` must be one of `1m..59m`, `1h..23h` or `1d..7d`.
    pub async fn rolling_ticker_for_symbol(
        &self,
        symbol: &str,
        window_size: &str,
        ticker_type: TickerType,
    ) -> Result<Value, DataError> {
        validate_window_size(window_size)?;
        self.rest
            .get(
                "ticker",
                &[
                    ("type", ticker_type.as_str().to_string()),
                    ("symbol", symbol.to_string()),
                    ("windowSize", window_size.to_string()),
                ],
            )
            .await
    }

    /// Rolling-window price change statistics for several symbols.
    pub async fn rolling_ticker_for_symbols(
        &self,
        symbols: &[&str],
        window_size: &str,
        ticker_type: TickerType,
    ) -> Result<Value, DataError> {
        validate_window_size(window_size)?;
        self.rest
            .get(
                "ticker",
                &[
                    ("type", ticker_type.as_str().to_string()),
                    ("symbols", symbols_param(symbols)),
                    ("windowSize", window_size.to_string()),
                ],
            )
            .await
    }

    /// Current account information. Requires API credentials; the query is
    /// signed with HMAC-SHA256 and the key is sent as `X-MBX-APIKEY`.
    pub async fn account_info(
        &self,
        api_key: &str,
        api_secret: &str,
        omit_zero_balances: bool,
    ) -> Result<Value, DataError> {
        let params = [
            ("omitZeroBalances", omit_zero_balances.to_string()),
            ("timestamp", Utc::now().timestamp_millis().to_string()),
        ];
        let query = signed_query(api_secret, &params)?;
        self.rest
            .get_raw_query("account", &query, &[("X-MBX-APIKEY", api_key)])
            .await
    }

    /// Kline/candlestick bars for a symbol. Klines are uniquely identified
    /// by their open time.
    pub async fn klines(&self, query: &KlineQuery) -> Result<Vec<Candle>, DataError> {
        klines::validate_interval(&query.interval)?;

        if !(1..=1000).contains(&query.limit) {
            return Err(DataError::InvalidArgument(format!(
                "invalid limit: {}. Supported limits: 1-1000",
                query.limit
            )));
        }

        let mut params = vec![
            ("symbol", query.symbol.clone()),
            ("interval", query.interval.clone()),
            ("limit", query.limit.to_string()),
        ];
        if let Some(start) = query.start {
            params.push(("startTime", start.timestamp_millis().to_string()));
        }
        if let Some(end) = query.end {
            params.push(("endTime", end.timestamp_millis().to_string()));
        }

        debug!(
            symbol = %query.symbol,
            interval = %query.interval,
            "fetching klines batch"
        );

        let raw: Vec<klines::BinanceKlineRaw> =
            self.rest.get(query.endpoint.path(), &params).await?;

        raw.into_iter()
            .map(Candle::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(DataError::Decode)
    }
}

/// Serialize a symbol list as the `["A","B"]` form Binance expects.
fn symbols_param(symbols: &[&str]) -> String {
    let quoted = symbols
        .iter()
        .map(|symbol| format!("\"{symbol}\""))
        .collect::<Vec<_>>()
        .join(",");
    format!("[{quoted}]")
}

/// Validate a rolling-ticker window size: `1m..59m`, `1h..23h` or `1d..7d`.
fn validate_window_size(window_size: &str) -> Result<(), DataError> {
    let invalid = || DataError::InvalidArgument(format!("invalid window size: '{window_size}'"));

    // Split on the last char boundary; the unit may be multi-byte garbage.
    let (unit_index, unit) = window_size.char_indices().next_back().ok_or_else(invalid)?;
    let amount: u32 = window_size[..unit_index].parse().map_err(|_| invalid())?;

    let valid = match unit {
        'm' => (1..=59).contains(&amount),
        'h' => (1..=23).contains(&amount),
        'd' => (1..=7).contains(&amount),
        _ => false,
    };

    if valid { Ok(()) } else { Err(invalid()) }
}
