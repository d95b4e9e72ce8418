//! Thin async clients for public cryptocurrency market-data APIs.
//!
//! Provides REST clients for Binance spot, Coinbase and Kraken, WebSocket
//! stream listeners for Binance, HMAC-SHA256 request signing for the few
//! Binance endpoints that need it, and a CSV-backed kline history that can
//! be backfilled by calendar year and kept current incrementally.
//!
//! Market-data endpoints that feed the typed [`Candle`] pipeline are decoded
//! into structs; the remaining pass-through endpoints return the JSON body
//! verbatim as [`serde_json::Value`].

/// Typed OHLCV candle shared by the REST decoders and the history table.
pub mod candle;

/// Serde helpers for positional (sequence-encoded) payloads.
pub mod de;

/// All errors produced by this crate.
pub mod error;

/// Per-exchange clients: Binance, Coinbase, Kraken.
pub mod exchange;

/// CSV-backed kline history: backfill, incremental update, integrity checks.
pub mod history;

/// Interval tokens ("1m", "4h", ...) and duration conversions.
pub mod interval;

/// Shared REST transport and request signing.
pub mod rest;

/// Pagination windows over a time range.
pub mod timeframe;

pub use candle::Candle;
pub use error::DataError;
pub use interval::{Interval, IntervalUnit};
pub use timeframe::{generate_timeframes, TimeFrame};
