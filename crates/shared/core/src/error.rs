//! Error taxonomy shared by the store and the gateways
//!
//! Every business failure is a [`MarketError`]. On the wire it travels as a
//! stable [`ErrorCode`]; codes group into an [`ErrorKind`] for callers that
//! only care about the broad class of failure.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entities::ItemId;
use crate::values::{Quantity, Role};

/// Broad failure class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed or out-of-range input
    Validation,
    /// Credentials or session rejected
    Auth,
    /// Unknown item / seller / buyer
    NotFound,
    /// Mutating an item owned by someone else
    Ownership,
    /// Not enough units in stock
    InsufficientInventory,
    /// Not enough units in the cart
    InsufficientCartQuantity,
    /// Framing or transport fault (connection-fatal, never sent as a response)
    Protocol,
    /// A backing service could not be reached in time
    Unavailable,
    /// Anything else
    Internal,
}

/// Stable error code carried in `error.code` of a response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    ValidationError,
    InvalidCredentials,
    AmbiguousUsername,
    InvalidSession,
    WrongRole,
    NotFound,
    NotOwner,
    InsufficientInventory,
    ItemNotInCart,
    CannotRemoveMore,
    UnknownAction,
    FeatureDisabled,
    BackendUnavailable,
    InternalError,
}

impl ErrorCode {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ErrorCode::ValidationError | ErrorCode::UnknownAction | ErrorCode::FeatureDisabled => {
                ErrorKind::Validation
            }
            ErrorCode::InvalidCredentials
            | ErrorCode::AmbiguousUsername
            | ErrorCode::InvalidSession
            | ErrorCode::WrongRole => ErrorKind::Auth,
            ErrorCode::NotFound => ErrorKind::NotFound,
            ErrorCode::NotOwner => ErrorKind::Ownership,
            ErrorCode::InsufficientInventory => ErrorKind::InsufficientInventory,
            ErrorCode::ItemNotInCart | ErrorCode::CannotRemoveMore => {
                ErrorKind::InsufficientCartQuantity
            }
            ErrorCode::BackendUnavailable => ErrorKind::Unavailable,
            ErrorCode::InternalError => ErrorKind::Internal,
        }
    }
}

/// Business-level failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarketError {
    #[error("{0}")]
    Validation(String),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("ambiguous username; please login using {}", .0.id_field())]
    AmbiguousUsername(Role),

    #[error("invalid or expired session")]
    InvalidSession,

    #[error("session role mismatch: expected a {expected} session")]
    WrongRole { expected: Role },

    #[error("unknown {0}")]
    NotFound(String),

    #[error("item {0} does not belong to this seller")]
    NotOwner(ItemId),

    #[error("insufficient inventory for {item}: requested {requested}, available {available}")]
    InsufficientInventory {
        item: ItemId,
        requested: u64,
        available: Quantity,
    },

    #[error("item {0} not in cart")]
    ItemNotInCart(ItemId),

    #[error("cannot remove {requested} units of {item}: only {in_cart} in cart")]
    CannotRemoveMore {
        item: ItemId,
        requested: Quantity,
        in_cart: Quantity,
    },

    #[error("unknown action: {0}")]
    UnknownAction(String),

    #[error("{0} is disabled")]
    FeatureDisabled(String),

    #[error("backend unavailable: {0}")]
    Unavailable(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl MarketError {
    /// Shorthand for a validation failure
    pub fn validation(msg: impl Into<String>) -> Self {
        MarketError::Validation(msg.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            MarketError::Validation(_) => ErrorCode::ValidationError,
            MarketError::InvalidCredentials => ErrorCode::InvalidCredentials,
            MarketError::AmbiguousUsername(_) => ErrorCode::AmbiguousUsername,
            MarketError::InvalidSession => ErrorCode::InvalidSession,
            MarketError::WrongRole { .. } => ErrorCode::WrongRole,
            MarketError::NotFound(_) => ErrorCode::NotFound,
            MarketError::NotOwner(_) => ErrorCode::NotOwner,
            MarketError::InsufficientInventory { .. } => ErrorCode::InsufficientInventory,
            MarketError::ItemNotInCart(_) => ErrorCode::ItemNotInCart,
            MarketError::CannotRemoveMore { .. } => ErrorCode::CannotRemoveMore,
            MarketError::UnknownAction(_) => ErrorCode::UnknownAction,
            MarketError::FeatureDisabled(_) => ErrorCode::FeatureDisabled,
            MarketError::Unavailable(_) => ErrorCode::BackendUnavailable,
            MarketError::Internal(_) => ErrorCode::InternalError,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.code().kind()
    }
}

pub type MarketResult<T> = std::result::Result<T, MarketError>;
