//! Item catalog: registration, seller mutations, feedback, search, checkout
//!
//! Items live in one `RwLock<BTreeMap>` so iteration (search, seller listings)
//! is in ItemId order. Id allocation uses a per-category counter so that
//! registrations in different categories never contend on the same entry.

use std::collections::BTreeMap;

use bazaar_core::{
    AccountId, CartLine, Category, Feedback, Item, ItemDraft, ItemId, MarketError, MarketResult,
    Price, Quantity, Timestamp, Transaction, TransactionLine, Vote, validate_price,
};
use dashmap::DashMap;
use log::{debug, info};
use parking_lot::RwLock;

use crate::search;

#[derive(Debug, Default)]
pub struct Catalog {
    items: RwLock<BTreeMap<ItemId, Item>>,
    next_number: DashMap<Category, u64>,
}

fn unknown_item() -> MarketError {
    MarketError::NotFound("item_id".to_string())
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next number in `category`; starts at 1 and is never reused
    fn allocate_id(&self, category: Category) -> ItemId {
        let mut next = self.next_number.entry(category).or_insert(1);
        let number = *next;
        *next += 1;
        ItemId::new(category, number)
    }

    /// Validate and list a new item. Invalid drafts do not consume an id.
    pub fn register(&self, seller_id: AccountId, draft: ItemDraft, now: Timestamp) -> MarketResult<Item> {
        draft.validate()?;
        let item_id = self.allocate_id(draft.category);
        let item = draft.into_item(item_id, seller_id, now)?;

        self.items.write().insert(item_id, item.clone());
        info!("seller {} registered item {} ({})", seller_id, item_id, item.name);
        Ok(item)
    }

    pub fn get(&self, item_id: &ItemId) -> MarketResult<Item> {
        self.items.read().get(item_id).cloned().ok_or_else(unknown_item)
    }

    /// Owner-only price change
    pub fn change_price(&self, seller_id: AccountId, item_id: &ItemId, price: Price) -> MarketResult<()> {
        validate_price(price, "new_price")?;
        let mut items = self.items.write();
        let item = owned_mut(&mut items, seller_id, item_id)?;
        item.price = price;
        debug!("item {} repriced to {}", item_id, price);
        Ok(())
    }

    /// Owner-only stock removal. Returns the remaining quantity.
    pub fn remove_units(&self, seller_id: AccountId, item_id: &ItemId, qty: Quantity) -> MarketResult<Quantity> {
        if qty == 0 {
            return Err(MarketError::validation("quantity to remove must be positive"));
        }
        let mut items = self.items.write();
        let item = owned_mut(&mut items, seller_id, item_id)?;
        if qty > item.quantity {
            return Err(MarketError::InsufficientInventory {
                item: *item_id,
                requested: u64::from(qty),
                available: item.quantity,
            });
        }
        item.quantity -= qty;
        Ok(item.quantity)
    }

    /// Items owned by `seller_id`, in ItemId order
    pub fn list_for_seller(&self, seller_id: AccountId) -> Vec<Item> {
        self.items
            .read()
            .values()
            .filter(|item| item.is_owned_by(seller_id))
            .cloned()
            .collect()
    }

    /// Record a vote on an item. Returns the new tally and the item's owner.
    pub fn vote(&self, item_id: &ItemId, vote: Vote) -> MarketResult<(Feedback, AccountId)> {
        let mut items = self.items.write();
        let item = items.get_mut(item_id).ok_or_else(unknown_item)?;
        item.feedback.record(vote);
        Ok((item.feedback, item.seller_id))
    }

    /// Ranked search; `keywords` are raw user input
    pub fn search(&self, category: Category, keywords: &[String]) -> MarketResult<Vec<Item>> {
        let query = search::normalize_query(keywords)?;
        let items = self.items.read();
        Ok(search::rank(items.values(), category, &query))
    }

    /// Check every line against stock and price the order, then decrement
    /// all of them.
    ///
    /// Runs under one write lock: either every line is applied or no item is
    /// touched. Unit prices are captured at this instant. Returns the priced
    /// lines and their total.
    pub fn checkout(&self, lines: &[CartLine]) -> MarketResult<(Vec<TransactionLine>, Price)> {
        let mut items = self.items.write();

        let mut purchased = Vec::with_capacity(lines.len());
        for line in lines {
            let item = items.get(&line.item_id).ok_or_else(unknown_item)?;
            if line.quantity > item.quantity {
                return Err(MarketError::InsufficientInventory {
                    item: line.item_id,
                    requested: u64::from(line.quantity),
                    available: item.quantity,
                });
            }
            purchased.push(TransactionLine {
                item_id: line.item_id,
                seller_id: item.seller_id,
                qty: line.quantity,
                price_each: item.price,
            });
        }
        let total = Transaction::total_of(&purchased)
            .ok_or_else(|| MarketError::validation("order total is too large"))?;

        for line in &purchased {
            if let Some(item) = items.get_mut(&line.item_id) {
                item.quantity -= line.qty;
            }
        }
        Ok((purchased, total))
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// Copy of every item, in ItemId order
    pub fn snapshot(&self) -> Vec<Item> {
        self.items.read().values().cloned().collect()
    }
}

fn owned_mut<'a>(
    items: &'a mut BTreeMap<ItemId, Item>,
    seller_id: AccountId,
    item_id: &ItemId,
) -> MarketResult<&'a mut Item> {
    let item = items.get_mut(item_id).ok_or_else(unknown_item)?;
    if !item.is_owned_by(seller_id) {
        return Err(MarketError::NotOwner(*item_id));
    }
    Ok(item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn draft(category: Category, name: &str, price: Price, quantity: i64) -> ItemDraft {
        ItemDraft {
            name: name.to_string(),
            category,
            keywords: vec![],
            condition: "new".to_string(),
            price,
            quantity,
        }
    }

    #[test]
    fn test_numbers_are_per_category() {
        let catalog = Catalog::new();
        let now = Utc::now();
        let a = catalog.register(1, draft(1, "a", dec!(1), 1), now).unwrap();
        let b = catalog.register(1, draft(2, "b", dec!(1), 1), now).unwrap();
        let c = catalog.register(1, draft(1, "c", dec!(1), 1), now).unwrap();

        assert_eq!(a.item_id, ItemId::new(1, 1));
        assert_eq!(b.item_id, ItemId::new(2, 1));
        assert_eq!(c.item_id, ItemId::new(1, 2));
    }

    #[test]
    fn test_invalid_draft_consumes_no_number() {
        let catalog = Catalog::new();
        let now = Utc::now();
        assert!(catalog.register(1, draft(1, "a", dec!(-1), 1), now).is_err());
        assert!(catalog.register(1, draft(1, "a", dec!(1), -1), now).is_err());
        let ok = catalog.register(1, draft(1, "a", dec!(1), 1), now).unwrap();
        assert_eq!(ok.item_id.number, 1);
    }

    #[test]
    fn test_owner_checks() {
        let catalog = Catalog::new();
        let item = catalog.register(1, draft(1, "lamp", dec!(10), 4), Utc::now()).unwrap();

        assert_eq!(
            catalog.change_price(2, &item.item_id, dec!(1)),
            Err(MarketError::NotOwner(item.item_id))
        );
        assert_eq!(catalog.get(&item.item_id).unwrap().price, dec!(10));

        catalog.change_price(1, &item.item_id, dec!(12.5)).unwrap();
        assert_eq!(catalog.get(&item.item_id).unwrap().price, dec!(12.5));
        assert!(catalog.change_price(1, &item.item_id, dec!(-3)).is_err());
    }

    #[test]
    fn test_remove_units_bounds() {
        let catalog = Catalog::new();
        let item = catalog.register(1, draft(1, "lamp", dec!(10), 4), Utc::now()).unwrap();

        assert_eq!(catalog.remove_units(1, &item.item_id, 3).unwrap(), 1);
        assert!(matches!(
            catalog.remove_units(1, &item.item_id, 2),
            Err(MarketError::InsufficientInventory { available: 1, .. })
        ));
        assert!(catalog.remove_units(1, &item.item_id, 0).is_err());
        assert!(matches!(
            catalog.remove_units(1, &ItemId::new(9, 9), 1),
            Err(MarketError::NotFound(_))
        ));
    }

    #[test]
    fn test_checkout_is_all_or_nothing() {
        let catalog = Catalog::new();
        let now = Utc::now();
        let a = catalog.register(1, draft(1, "a", dec!(2), 5), now).unwrap();
        let b = catalog.register(2, draft(1, "b", dec!(3), 1), now).unwrap();

        let res = catalog.checkout(&[
            CartLine { item_id: a.item_id, quantity: 2 },
            CartLine { item_id: b.item_id, quantity: 2 },
        ]);
        assert!(matches!(res, Err(MarketError::InsufficientInventory { .. })));
        assert_eq!(catalog.get(&a.item_id).unwrap().quantity, 5);

        let (lines, total) = catalog
            .checkout(&[
                CartLine { item_id: a.item_id, quantity: 2 },
                CartLine { item_id: b.item_id, quantity: 1 },
            ])
            .unwrap();
        assert_eq!(total, dec!(7));
        assert_eq!(lines[1].seller_id, 2);
        assert_eq!(lines[0].price_each, dec!(2));
        assert_eq!(catalog.get(&a.item_id).unwrap().quantity, 3);
        assert_eq!(catalog.get(&b.item_id).unwrap().quantity, 0);
    }

    #[test]
    fn test_overflowing_order_touches_nothing() {
        let catalog = Catalog::new();
        let now = Utc::now();
        let a = catalog.register(1, draft(1, "a", dec!(2), 5), now).unwrap();
        let huge = catalog.register(1, draft(1, "huge", Price::MAX, 2), now).unwrap();

        let res = catalog.checkout(&[
            CartLine { item_id: a.item_id, quantity: 1 },
            CartLine { item_id: huge.item_id, quantity: 2 },
        ]);
        assert!(matches!(res, Err(MarketError::Validation(_))));
        assert_eq!(catalog.get(&a.item_id).unwrap().quantity, 5);
        assert_eq!(catalog.get(&huge.item_id).unwrap().quantity, 2);
    }

    #[test]
    fn test_vote_returns_owner() {
        let catalog = Catalog::new();
        let item = catalog.register(4, draft(1, "a", dec!(2), 5), Utc::now()).unwrap();
        let (feedback, owner) = catalog.vote(&item.item_id, Vote::Down).unwrap();
        assert_eq!(owner, 4);
        assert_eq!(feedback.score(), -1);
    }
}
