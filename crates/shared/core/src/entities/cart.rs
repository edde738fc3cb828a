use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::ItemId;
use crate::error::{MarketError, MarketResult};
use crate::values::Quantity;

/// One cart entry as it appears on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub item_id: ItemId,
    pub quantity: Quantity,
}

/// Mapping ItemId -> quantity
///
/// Used both as a session's active cart and as a buyer's saved cart. A cart
/// never stores a zero quantity: removing the last unit drops the entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: BTreeMap<ItemId, Quantity>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn quantity_of(&self, item_id: &ItemId) -> Quantity {
        self.lines.get(item_id).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Add units, creating the entry if absent. Returns the new quantity.
    pub fn add(&mut self, item_id: ItemId, qty: Quantity) -> MarketResult<Quantity> {
        if qty == 0 {
            return Err(MarketError::validation("quantity must be positive"));
        }
        let entry = self.lines.entry(item_id).or_insert(0);
        *entry = entry
            .checked_add(qty)
            .ok_or_else(|| MarketError::validation("cart quantity overflow"))?;
        Ok(*entry)
    }

    /// Remove units. Returns the quantity left in the cart.
    pub fn remove(&mut self, item_id: ItemId, qty: Quantity) -> MarketResult<Quantity> {
        if qty == 0 {
            return Err(MarketError::validation("quantity must be positive"));
        }
        let current = self.quantity_of(&item_id);
        if current == 0 {
            return Err(MarketError::ItemNotInCart(item_id));
        }
        if qty > current {
            return Err(MarketError::CannotRemoveMore {
                item: item_id,
                requested: qty,
                in_cart: current,
            });
        }
        let left = current - qty;
        if left == 0 {
            self.lines.remove(&item_id);
        } else {
            self.lines.insert(item_id, left);
        }
        Ok(left)
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Entries in ItemId order
    pub fn lines(&self) -> Vec<CartLine> {
        self.lines
            .iter()
            .map(|(item_id, quantity)| CartLine {
                item_id: *item_id,
                quantity: *quantity,
            })
            .collect()
    }
}

impl FromIterator<CartLine> for Cart {
    fn from_iter<I: IntoIterator<Item = CartLine>>(iter: I) -> Self {
        let mut cart = Cart::new();
        for line in iter {
            if line.quantity > 0 {
                *cart.lines.entry(line.item_id).or_insert(0) += line.quantity;
            }
        }
        cart
    }
}
