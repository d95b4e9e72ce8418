/// Binance spot REST client and WebSocket stream listeners.
pub mod binance;

/// Coinbase v2 + Exchange API REST client.
pub mod coinbase;

/// Kraken public REST client.
pub mod kraken;
