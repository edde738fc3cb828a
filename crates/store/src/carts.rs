//! Saved carts, one slot per buyer

use bazaar_core::{AccountId, Cart};
use dashmap::DashMap;

/// Buyer id -> last saved cart. Last writer wins.
#[derive(Debug, Default)]
pub struct SavedCarts {
    slots: DashMap<AccountId, Cart>,
}

impl SavedCarts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the buyer's slot with a copy of `cart`
    pub fn save(&self, buyer_id: AccountId, cart: &Cart) {
        self.slots.insert(buyer_id, cart.clone());
    }

    /// Copy of the saved cart, or an empty cart if nothing was saved
    pub fn load(&self, buyer_id: AccountId) -> Cart {
        self.slots
            .get(&buyer_id)
            .map(|slot| slot.value().clone())
            .unwrap_or_default()
    }

    pub fn has_saved(&self, buyer_id: AccountId) -> bool {
        self.slots.contains_key(&buyer_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bazaar_core::ItemId;

    #[test]
    fn test_load_returns_a_copy() {
        let carts = SavedCarts::new();
        let mut cart = Cart::new();
        cart.add(ItemId::new(1, 1), 2).unwrap();
        carts.save(7, &cart);

        let mut loaded = carts.load(7);
        loaded.add(ItemId::new(1, 1), 5).unwrap();

        assert_eq!(carts.load(7).quantity_of(&ItemId::new(1, 1)), 2);
        assert!(carts.load(8).is_empty());
        assert!(!carts.has_saved(8));
    }

    #[test]
    fn test_last_save_wins() {
        let carts = SavedCarts::new();
        let mut first = Cart::new();
        first.add(ItemId::new(1, 1), 1).unwrap();
        let mut second = Cart::new();
        second.add(ItemId::new(2, 1), 4).unwrap();

        carts.save(1, &first);
        carts.save(1, &second);
        assert_eq!(carts.load(1), second);
    }
}
