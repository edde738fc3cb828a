//! Bazaar Core Domain
//!
//! Pure domain types for the Bazaar marketplace: accounts, listings, sessions,
//! carts, transactions and the error taxonomy shared by every service.
//! This crate contains no async, no I/O, and is 100% unit testable.

pub mod entities;
pub mod error;
pub mod values;

// Re-export commonly used types at crate root
pub use entities::{
    Buyer, Cart, CartLine, Credential, Feedback, Item, ItemDraft, ItemId, MAX_KEYWORD_CHARS,
    MAX_KEYWORDS, MAX_NAME_CHARS, Seller, SellerRating, Session, SessionToken, Transaction,
    TransactionId, TransactionLine, validate_name, validate_price,
};
pub use error::{ErrorCode, ErrorKind, MarketError, MarketResult};
pub use values::{AccountId, Category, Condition, Price, Quantity, Role, Timestamp, Vote};
