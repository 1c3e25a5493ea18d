use thiserror::Error;

/// Errors that can occur when talking to a DataLayer store.
#[derive(Debug, Error)]
pub enum Error {
    /// The HTTP request could not be sent or the response body could not be read.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The node answered but reported `success: false`.
    #[error("{method} was not successful: {reason}")]
    Unsuccessful { method: String, reason: String },

    /// The response did not have the expected shape.
    #[error("malformed {method} response: {detail}")]
    Malformed { method: String, detail: String },

    /// A key or value was not valid hexadecimal.
    #[error("invalid hex payload: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    /// The requested store is not known to this client.
    #[error("unknown store: {0}")]
    UnknownStore(String),

    /// JSON (de)serialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error, e.g. while loading TLS material.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Client configuration is unusable.
    #[error("config error: {0}")]
    Config(String),
}

/// Result type for datalayer-rpc operations.
pub type Result<T> = std::result::Result<T, Error>;
