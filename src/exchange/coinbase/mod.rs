use crate::{error::DataError, rest::RestClient};
use serde_json::Value;

/// Coinbase v2 API base URL.
pub const API_BASE_URL: &str = "https://api.coinbase.com/v2/";

/// Coinbase Exchange (market data) API base URL.
pub const EXCHANGE_BASE_URL: &str = "https://api.exchange.coinbase.com/";

/// Candle granularities accepted by the Coinbase Exchange API, in seconds.
pub const CANDLE_GRANULARITIES: [u32; 6] = [60, 300, 900, 3600, 21600, 86400];

/// Client for the Coinbase public APIs.
///
/// Coinbase splits its surface across two hosts: the v2 API (server time,
/// currencies, product listings) and the Exchange API (market data). Both
/// are held here; every endpoint returns the decoded JSON body verbatim.
#[derive(Debug, Clone)]
pub struct CoinbaseClient {
    api: RestClient,
    exchange: RestClient,
}

impl CoinbaseClient {
    pub fn new() -> Result<Self, DataError> {
        Self::with_base_urls(API_BASE_URL, EXCHANGE_BASE_URL)
    }

    /// Construct a client against custom base URLs, e.g. mock servers.
    pub fn with_base_urls(api_base_url: &str, exchange_base_url: &str) -> Result<Self, DataError> {
        Ok(Self {
            api: RestClient::new(api_base_url)?,
            exchange: RestClient::new(exchange_base_url)?,
        })
    }

    /// Test connectivity and get the current server time.
    pub async fn server_time(&self) -> Result<Value, DataError> {
        self.api.get("time", &[]).await
    }

    /// List all known currencies.
    pub async fn list_currencies(&self) -> Result<Value, DataError> {
        self.api.get("currencies", &[]).await
    }

    /// A single currency by code.
    pub async fn currency(&self, currency_id: &str) -> Result<Value, DataError> {
        self.api.get(&format!("currencies/{currency_id}"), &[]).await
    }

    /// Trading pair listing for one product from the v2 API.
    pub async fn single_product_pairs(&self, product_id: &str) -> Result<Value, DataError> {
        self.api
            .get("products", &[("product_id", product_id.to_string())])
            .await
    }

    /// All trading pairs known to the Exchange API.
    pub async fn list_trading_pairs(&self) -> Result<Value, DataError> {
        self.exchange.get("products", &[]).await
    }

    /// 30-day and 24-hour volume summary for all products.
    pub async fn all_product_volume(&self) -> Result<Value, DataError> {
        self.exchange.get("products/volume-summary", &[]).await
    }

    /// Exchange API product information for one product.
    pub async fn single_product_info(&self, product_id: &str) -> Result<Value, DataError> {
        self.exchange
            .get("products", &[("product_id", product_id.to_string())])
            .await
    }

    /// Historic candles for a product.
    ///
    /// `granularity` (seconds per bucket) must be one of
    /// [`CANDLE_GRANULARITIES`] when given.
    pub async fn product_candles(
        &self,
        product_id: &str,
        granularity: Option<u32>,
    ) -> Result<Value, DataError> {
        let mut params = Vec::new();
        if let Some(granularity) = granularity {
            if !CANDLE_GRANULARITIES.contains(&granularity) {
                return Err(DataError::InvalidArgument(format!(
                    "invalid granularity: {granularity}. Supported granularities: {CANDLE_GRANULARITIES:?}"
                )));
            }
            params.push(("granularity", granularity.to_string()));
        }
        self.exchange
            .get(&format!("products/{product_id}/candles"), &params)
            .await
    }

    /// 24-hour statistics for a product.
    pub async fn product_stats(&self, product_id: &str) -> Result<Value, DataError> {
        self.exchange
            .get(&format!("products/{product_id}/stats"), &[])
            .await
    }

    /// Snapshot of the last trade, best bid/ask and 24h volume.
    pub async fn product_ticker(&self, product_id: &str) -> Result<Value, DataError> {
        self.exchange
            .get(&format!("products/{product_id}/ticker"), &[])
            .await
    }

    /// Latest trades for a product.
    pub async fn product_trades(&self, product_id: &str) -> Result<Value, DataError> {
        self.exchange
            .get(&format!("products/{product_id}/trades"), &[])
            .await
    }
}
