use crate::error::DataError;
use futures::{SinkExt, StreamExt};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info};

use super::klines::validate_interval;

/// Binance market-data WebSocket base URL.
pub const WS_BASE_URL: &str = "wss://stream.binance.com:9443/ws/";

/// Build the stream URL for a lower-cased symbol and channel suffix,
/// e.g. `("BTCUSDT", "@trade")` -> `wss://.../ws/btcusdt@trade`.
pub fn stream_url(symbol: &str, channel: &str) -> String {
    format!("{WS_BASE_URL}{}{channel}", symbol.to_lowercase())
}

/// Listen to average price updates for a symbol pair.
///
/// Stream name: `<symbol>@avgPrice`, update speed 1000ms.
pub async fn listen_to_average_price(symbol: &str) -> Result<(), DataError> {
    run_listener(&stream_url(symbol, "@avgPrice"), "avgPrice").await
}

/// Listen to raw trades for a symbol pair.
///
/// Stream name: `<symbol>@trade`, real-time.
pub async fn listen_to_trades(symbol: &str) -> Result<(), DataError> {
    run_listener(&stream_url(symbol, "@trade"), "trade").await
}

/// Listen to kline/candlestick updates for a symbol pair.
///
/// Stream name: `<symbol>@kline_<interval>`; the interval token is validated
/// against the same allow-list as the REST klines endpoint before any
/// connection is opened.
pub async fn listen_to_klines(symbol: &str, interval: &str) -> Result<(), DataError> {
    validate_interval(interval)?;
    run_listener(&stream_url(symbol, &format!("@kline_{interval}")), "kline").await
}

/// Open one socket and run an unbounded receive loop: decode each text frame
/// as JSON and emit it. No reconnect, no backpressure; returns on the first
/// transport error or when the server closes the connection.
async fn run_listener(url: &str, stream: &'static str) -> Result<(), DataError> {
    let (socket, _response) = connect_async(url).await?;
    info!(%url, stream, "connected to Binance WebSocket");

    let (mut write, mut read) = socket.split();

    while let Some(message) = read.next().await {
        match message? {
            Message::Text(text) => {
                let data: serde_json::Value = serde_json::from_str(&text)
                    .map_err(|e| DataError::Decode(e.to_string()))?;
                info!(stream, %data, "message received");
            }
            Message::Ping(payload) => write.send(Message::Pong(payload)).await?,
            Message::Close(frame) => {
                debug!(stream, ?frame, "stream closed by server");
                break;
            }
            _ => {}
        }
    }

    Ok(())
}
