//! Error types for the protocol crate

use thiserror::Error;

/// Framing / transport fault. Always terminates the connection.
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("connection closed while reading a frame")]
    ConnectionClosed,

    #[error("invalid payload length: {0}")]
    InvalidLength(u64),

    #[error("invalid json payload: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("payload must be a JSON object")]
    NotAnObject,

    #[error("malformed envelope: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
