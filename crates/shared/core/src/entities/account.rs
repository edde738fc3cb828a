use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::{Feedback, ItemId};
use crate::values::{AccountId, Timestamp};

/// One-way digest of an account password
///
/// Only the digest is stored; it is never serialized onto the wire.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn from_password(password: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(password.as_bytes());
        Credential(hex::encode(hasher.finalize()))
    }

    pub fn matches(&self, password: &str) -> bool {
        *self == Credential::from_password(password)
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(..)")
    }
}

/// Buyer account
#[derive(Debug, Clone)]
pub struct Buyer {
    pub id: AccountId,
    pub name: String,
    pub credential: Credential,
    /// Total units bought across all transactions
    pub items_purchased: u64,
    /// Items bought, in purchase order
    pub purchases: Vec<ItemId>,
    pub created_at: Timestamp,
}

impl Buyer {
    pub fn new(id: AccountId, name: String, credential: Credential, created_at: Timestamp) -> Self {
        Self {
            id,
            name,
            credential,
            items_purchased: 0,
            purchases: Vec::new(),
            created_at,
        }
    }
}

/// Seller account
#[derive(Debug, Clone)]
pub struct Seller {
    pub id: AccountId,
    pub name: String,
    pub credential: Credential,
    pub feedback: Feedback,
    pub items_sold: u64,
    pub created_at: Timestamp,
}

impl Seller {
    pub fn new(id: AccountId, name: String, credential: Credential, created_at: Timestamp) -> Self {
        Self {
            id,
            name,
            credential,
            feedback: Feedback::default(),
            items_sold: 0,
            created_at,
        }
    }

    pub fn rating(&self) -> SellerRating {
        SellerRating {
            seller_id: self.id,
            seller_feedback: self.feedback,
            items_sold: self.items_sold,
        }
    }
}

/// Public view of a seller's standing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerRating {
    pub seller_id: AccountId,
    pub seller_feedback: Feedback,
    pub items_sold: u64,
}
