use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ItemId;
use crate::values::{AccountId, Price, Quantity, Timestamp};

/// Unique identifier for a purchase
pub type TransactionId = Uuid;

/// One purchased item, priced at the moment of checkout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionLine {
    pub item_id: ItemId,
    pub seller_id: AccountId,
    pub qty: Quantity,
    #[serde(with = "rust_decimal::serde::float")]
    pub price_each: Price,
}

impl TransactionLine {
    /// `None` when the product does not fit in a `Price`
    pub fn subtotal(&self) -> Option<Price> {
        self.price_each.checked_mul(Price::from(self.qty))
    }
}

/// Completed checkout; immutable once recorded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub txn_id: TransactionId,
    pub buyer_id: AccountId,
    pub items: Vec<TransactionLine>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Price,
    pub created_at: Timestamp,
}

impl Transaction {
    /// Sum of every line's subtotal, or `None` on overflow
    pub fn total_of(items: &[TransactionLine]) -> Option<Price> {
        items
            .iter()
            .try_fold(Price::ZERO, |total, line| total.checked_add(line.subtotal()?))
    }

    /// `total` must come from [`Transaction::total_of`] over the same lines
    pub fn new(
        buyer_id: AccountId,
        items: Vec<TransactionLine>,
        total: Price,
        created_at: Timestamp,
    ) -> Self {
        Self {
            txn_id: Uuid::new_v4(),
            buyer_id,
            items,
            total,
            created_at,
        }
    }

    pub fn units(&self) -> u64 {
        self.items.iter().map(|line| u64::from(line.qty)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    #[test]
    fn test_total_uses_captured_prices() {
        let items = vec![
            TransactionLine {
                item_id: ItemId::new(1, 1),
                seller_id: 1,
                qty: 2,
                price_each: dec!(10.25),
            },
            TransactionLine {
                item_id: ItemId::new(2, 1),
                seller_id: 2,
                qty: 1,
                price_each: dec!(5),
            },
        ];
        let total = Transaction::total_of(&items).unwrap();
        let txn = Transaction::new(3, items, total, Utc::now());

        assert_eq!(txn.total, dec!(25.50));
        assert_eq!(txn.units(), 3);
    }

    #[test]
    fn test_overflowing_total_is_none() {
        let line = TransactionLine {
            item_id: ItemId::new(1, 1),
            seller_id: 1,
            qty: 2,
            price_each: Price::MAX,
        };
        assert_eq!(line.subtotal(), None);

        let lines = vec![
            TransactionLine { qty: 1, ..line.clone() },
            TransactionLine { qty: 1, price_each: dec!(1), ..line },
        ];
        assert!(lines.iter().all(|l| l.subtotal().is_some()));
        assert_eq!(Transaction::total_of(&lines), None);
    }
}
