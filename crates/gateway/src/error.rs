//! Error types for the gateway crate

use bazaar_core::{ErrorCode, MarketError};
use bazaar_protocol::{ErrorBody, ProtocolError};
use thiserror::Error;

/// Transport-level errors talking to the store
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Connection failed: {0}")]
    Connection(#[source] std::io::Error),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Connection closed before a response arrived")]
    Closed,

    #[error("Timeout waiting for response")]
    Timeout,

    #[error("Response req_id {got:?} does not match request {expected:?}")]
    ReqIdMismatch { expected: String, got: String },
}

/// Gateway-level errors (one request)
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Rejected locally before reaching the store
    #[error(transparent)]
    Market(#[from] MarketError),

    /// The store answered `ok: false`; relayed as-is
    #[error("{}", .0.message)]
    Rejected(ErrorBody),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

impl GatewayError {
    /// Error member for the client response. Transport failures surface as
    /// `backend_unavailable`.
    pub fn to_body(&self) -> ErrorBody {
        match self {
            GatewayError::Market(err) => ErrorBody::from(err),
            GatewayError::Rejected(body) => body.clone(),
            GatewayError::Transport(err) => ErrorBody {
                code: ErrorCode::BackendUnavailable,
                message: format!("store unavailable: {}", err),
            },
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            GatewayError::Market(err) => err.code(),
            GatewayError::Rejected(body) => body.code,
            GatewayError::Transport(_) => ErrorCode::BackendUnavailable,
        }
    }
}
