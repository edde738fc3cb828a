use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::MarketError;

/// Sale price - uses Decimal for precision, never negative once validated
pub type Price = Decimal;

/// Unit count for inventory and cart lines
pub type Quantity = u32;

/// Timestamp in UTC
pub type Timestamp = DateTime<Utc>;

/// Account identifier, unique within its role
pub type AccountId = u64;

/// Item category (any integer)
pub type Category = i64;

/// Which side of the marketplace a principal acts on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Buyer,
    Seller,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Buyer => "buyer",
            Role::Seller => "seller",
        }
    }

    /// Data field carrying an account id for this role: `buyer_id` / `seller_id`
    pub fn id_field(&self) -> &'static str {
        match self {
            Role::Buyer => "buyer_id",
            Role::Seller => "seller_id",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buyer" => Ok(Role::Buyer),
            "seller" => Ok(Role::Seller),
            other => Err(MarketError::Validation(format!(
                "invalid role '{}' (expected buyer or seller)",
                other
            ))),
        }
    }
}

/// Condition of a listed item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    New,
    Used,
}

impl FromStr for Condition {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "new" => Ok(Condition::New),
            "used" => Ok(Condition::Used),
            _ => Err(MarketError::Validation(
                "condition must be 'new' or 'used'".to_string(),
            )),
        }
    }
}

/// A single thumbs-up / thumbs-down vote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vote {
    Up,
    Down,
}

impl FromStr for Vote {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(Vote::Up),
            "down" => Ok(Vote::Down),
            _ => Err(MarketError::Validation(
                "vote must be 'up' or 'down'".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_is_case_insensitive() {
        assert_eq!(" Buyer ".parse::<Role>().unwrap(), Role::Buyer);
        assert_eq!("SELLER".parse::<Role>().unwrap(), Role::Seller);
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn test_condition_and_vote_parse() {
        assert_eq!("USED".parse::<Condition>().unwrap(), Condition::Used);
        assert!("broken".parse::<Condition>().is_err());
        assert_eq!("down".parse::<Vote>().unwrap(), Vote::Down);
        assert!("sideways".parse::<Vote>().is_err());
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Seller).unwrap(), "\"seller\"");
    }
}
