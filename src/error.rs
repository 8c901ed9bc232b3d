use thiserror::Error;

/// Errors surfaced to the caller. Per-block and per-transaction failures
/// never reach this type; they degrade to empty data inside the scanner.
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("RPC error: {0}")]
    Rpc(serde_json::Value),

    #[error("invalid hex quantity: {0:?}")]
    HexQuantity(String),

    #[error("report I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("report serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
