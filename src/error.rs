use reqwest::StatusCode;
use thiserror::Error;

/// All errors surfaced by this crate.
///
/// Validation failures ([`DataError::InvalidArgument`]) are always raised
/// before any network call is made. Non-2xx responses surface as
/// [`DataError::RequestFailed`] carrying the status code and response body.
/// There is no retry or local recovery anywhere; every error propagates to
/// the immediate caller.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("request failed with status {status}: {body}")]
    RequestFailed { status: StatusCode, body: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("csv storage error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
