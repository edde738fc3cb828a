use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::MarketError;
use crate::values::Category;

/// Identifier of a listing: `<category, per-category sequence number>`
///
/// Ordering is `(category, number)`, which search uses as its final
/// tie-break. Serializes as `{"category": c, "number": n}`; deserializes from
/// that object, from a `"c:n"` string key, or from a `[c, n]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ItemId {
    pub category: Category,
    pub number: u64,
}

impl ItemId {
    pub fn new(category: Category, number: u64) -> Self {
        Self { category, number }
    }

    /// Stable string key `"category:number"`
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.category, self.number)
    }
}

impl FromStr for ItemId {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid =
            || MarketError::validation("invalid item_id string; expected 'category:number'");
        let (category, number) = s.trim().split_once(':').ok_or_else(invalid)?;
        let category = category.trim().parse().map_err(|_| invalid())?;
        let number = number.trim().parse().map_err(|_| invalid())?;
        Ok(ItemId::new(category, number))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ItemIdRepr {
    Object { category: Category, number: u64 },
    Pair(Category, u64),
    Key(String),
}

impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match ItemIdRepr::deserialize(deserializer)? {
            ItemIdRepr::Object { category, number } | ItemIdRepr::Pair(category, number) => {
                Ok(ItemId::new(category, number))
            }
            ItemIdRepr::Key(key) => key.parse().map_err(serde::de::Error::custom),
        }
    }
}
