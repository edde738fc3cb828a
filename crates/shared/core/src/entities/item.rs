use serde::{Deserialize, Serialize};

use super::ItemId;
use crate::error::{MarketError, MarketResult};
use crate::values::{AccountId, Category, Condition, Price, Quantity, Timestamp, Vote};

pub const MAX_NAME_CHARS: usize = 32;
pub const MAX_KEYWORDS: usize = 5;
pub const MAX_KEYWORD_CHARS: usize = 8;

/// Thumbs-up / thumbs-down tally
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub thumbs_up: u64,
    pub thumbs_down: u64,
}

impl Feedback {
    /// Feedback score: `thumbs_up - thumbs_down`
    pub fn score(&self) -> i64 {
        self.thumbs_up as i64 - self.thumbs_down as i64
    }

    pub fn record(&mut self, vote: Vote) {
        match vote {
            Vote::Up => self.thumbs_up += 1,
            Vote::Down => self.thumbs_down += 1,
        }
    }
}

/// A listing owned by exactly one seller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub item_id: ItemId,
    pub seller_id: AccountId,
    #[serde(rename = "item_name")]
    pub name: String,
    #[serde(rename = "item_category")]
    pub category: Category,
    pub keywords: Vec<String>,
    pub condition: Condition,
    #[serde(rename = "sale_price", with = "rust_decimal::serde::float")]
    pub price: Price,
    #[serde(rename = "item_quantity")]
    pub quantity: Quantity,
    #[serde(rename = "item_feedback")]
    pub feedback: Feedback,
    pub created_at: Timestamp,
}

impl Item {
    pub fn is_owned_by(&self, seller_id: AccountId) -> bool {
        self.seller_id == seller_id
    }

    pub fn in_stock(&self) -> bool {
        self.quantity > 0
    }
}

/// Unvalidated listing attributes as submitted by a seller
#[derive(Debug, Clone, PartialEq)]
pub struct ItemDraft {
    pub name: String,
    pub category: Category,
    pub keywords: Vec<String>,
    pub condition: String,
    pub price: Price,
    pub quantity: i64,
}

impl ItemDraft {
    /// Validate the draft and turn it into a listing with the given id
    pub fn into_item(
        self,
        item_id: ItemId,
        seller_id: AccountId,
        created_at: Timestamp,
    ) -> MarketResult<Item> {
        validate_name(&self.name, "item_name")?;
        let condition = self.condition.parse::<Condition>()?;
        validate_price(self.price, "sale_price")?;
        let quantity = validate_quantity(self.quantity, "item_quantity")?;
        let keywords = validate_keywords(self.keywords)?;

        Ok(Item {
            item_id,
            seller_id,
            name: self.name,
            category: self.category,
            keywords,
            condition,
            price: self.price,
            quantity,
            feedback: Feedback::default(),
            created_at,
        })
    }

    /// Run validation without consuming the draft
    pub fn validate(&self) -> MarketResult<()> {
        validate_name(&self.name, "item_name")?;
        self.condition.parse::<Condition>()?;
        validate_price(self.price, "sale_price")?;
        validate_quantity(self.quantity, "item_quantity")?;
        validate_keywords(self.keywords.clone()).map(|_| ())
    }
}

/// Names (accounts and items) are 1..=32 characters
pub fn validate_name(name: &str, field: &str) -> MarketResult<()> {
    let len = name.chars().count();
    if len == 0 || len > MAX_NAME_CHARS {
        return Err(MarketError::Validation(format!(
            "{} must be 1..{} characters",
            field, MAX_NAME_CHARS
        )));
    }
    Ok(())
}

pub fn validate_price(price: Price, field: &str) -> MarketResult<()> {
    if price < Price::ZERO {
        return Err(MarketError::Validation(format!("{} must be >= 0", field)));
    }
    Ok(())
}

fn validate_quantity(quantity: i64, field: &str) -> MarketResult<Quantity> {
    if quantity < 0 {
        return Err(MarketError::Validation(format!("{} must be >= 0", field)));
    }
    Quantity::try_from(quantity)
        .map_err(|_| MarketError::Validation(format!("{} is too large", field)))
}

fn validate_keywords(keywords: Vec<String>) -> MarketResult<Vec<String>> {
    if keywords.len() > MAX_KEYWORDS {
        return Err(MarketError::Validation(format!(
            "keywords must have at most {} entries",
            MAX_KEYWORDS
        )));
    }
    for keyword in &keywords {
        let len = keyword.chars().count();
        if len == 0 || len > MAX_KEYWORD_CHARS {
            return Err(MarketError::Validation(format!(
                "each keyword must be 1..{} characters",
                MAX_KEYWORD_CHARS
            )));
        }
    }
    Ok(keywords)
}
