//! Buyer and seller account tables

use std::collections::HashMap;

use bazaar_core::{
    AccountId, Buyer, Credential, ItemId, MarketError, MarketResult, Role, Seller, SellerRating,
    Timestamp, TransactionLine, Vote, validate_name,
};
use log::debug;
use parking_lot::RwLock;

#[derive(Debug)]
struct Tables {
    buyers: HashMap<AccountId, Buyer>,
    sellers: HashMap<AccountId, Seller>,
    /// name -> ids, names may collide
    buyer_names: HashMap<String, Vec<AccountId>>,
    seller_names: HashMap<String, Vec<AccountId>>,
    next_buyer_id: AccountId,
    next_seller_id: AccountId,
}

impl Default for Tables {
    fn default() -> Self {
        Self {
            buyers: HashMap::new(),
            sellers: HashMap::new(),
            buyer_names: HashMap::new(),
            seller_names: HashMap::new(),
            next_buyer_id: 1,
            next_seller_id: 1,
        }
    }
}

impl Tables {
    fn credential(&self, role: Role, id: AccountId) -> Option<&Credential> {
        match role {
            Role::Buyer => self.buyers.get(&id).map(|b| &b.credential),
            Role::Seller => self.sellers.get(&id).map(|s| &s.credential),
        }
    }

    fn names(&self, role: Role) -> &HashMap<String, Vec<AccountId>> {
        match role {
            Role::Buyer => &self.buyer_names,
            Role::Seller => &self.seller_names,
        }
    }
}

/// Account registry, one exclusion domain for both roles
#[derive(Debug, Default)]
pub struct AccountTable {
    inner: RwLock<Tables>,
}

impl AccountTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account and return its id (ids are per role, starting at 1)
    pub fn create(
        &self,
        role: Role,
        name: &str,
        password: &str,
        now: Timestamp,
    ) -> MarketResult<AccountId> {
        validate_name(name, "name")?;
        let credential = Credential::from_password(password);

        let mut tables = self.inner.write();
        let id = match role {
            Role::Buyer => {
                let id = tables.next_buyer_id;
                tables.next_buyer_id += 1;
                tables
                    .buyers
                    .insert(id, Buyer::new(id, name.to_string(), credential, now));
                tables.buyer_names.entry(name.to_string()).or_default().push(id);
                id
            }
            Role::Seller => {
                let id = tables.next_seller_id;
                tables.next_seller_id += 1;
                tables
                    .sellers
                    .insert(id, Seller::new(id, name.to_string(), credential, now));
                tables.seller_names.entry(name.to_string()).or_default().push(id);
                id
            }
        };
        debug!("created {} account {} ({})", role, id, name);
        Ok(id)
    }

    /// Resolve `username` + `password` to an account id.
    ///
    /// An all-digit username is an id lookup. Otherwise the name must match,
    /// byte for byte, exactly one account whose credential also matches.
    pub fn authenticate(&self, role: Role, username: &str, password: &str) -> MarketResult<AccountId> {
        let tables = self.inner.read();

        if !username.is_empty() && username.chars().all(|c| c.is_ascii_digit()) {
            let id: AccountId = username
                .parse()
                .map_err(|_| MarketError::InvalidCredentials)?;
            return match tables.credential(role, id) {
                Some(credential) if credential.matches(password) => Ok(id),
                _ => Err(MarketError::InvalidCredentials),
            };
        }

        let matches: Vec<AccountId> = tables
            .names(role)
            .get(username)
            .map(|ids| {
                ids.iter()
                    .copied()
                    .filter(|id| {
                        tables
                            .credential(role, *id)
                            .is_some_and(|c| c.matches(password))
                    })
                    .collect()
            })
            .unwrap_or_default();

        match matches.as_slice() {
            [id] => Ok(*id),
            [] => Err(MarketError::InvalidCredentials),
            _ => Err(MarketError::AmbiguousUsername(role)),
        }
    }

    pub fn exists(&self, role: Role, id: AccountId) -> bool {
        let tables = self.inner.read();
        match role {
            Role::Buyer => tables.buyers.contains_key(&id),
            Role::Seller => tables.sellers.contains_key(&id),
        }
    }

    pub fn seller_rating(&self, seller_id: AccountId) -> MarketResult<SellerRating> {
        self.inner
            .read()
            .sellers
            .get(&seller_id)
            .map(Seller::rating)
            .ok_or_else(|| MarketError::NotFound("seller_id".to_string()))
    }

    pub fn buyer(&self, buyer_id: AccountId) -> MarketResult<Buyer> {
        self.inner
            .read()
            .buyers
            .get(&buyer_id)
            .cloned()
            .ok_or_else(|| MarketError::NotFound("buyer_id".to_string()))
    }

    /// Accrue a vote cast on one of the seller's items
    pub fn record_vote(&self, seller_id: AccountId, vote: Vote) -> MarketResult<()> {
        let mut tables = self.inner.write();
        let seller = tables
            .sellers
            .get_mut(&seller_id)
            .ok_or_else(|| MarketError::NotFound("seller_id".to_string()))?;
        seller.feedback.record(vote);
        Ok(())
    }

    /// Apply a completed checkout: buyer history plus each seller's sold count
    pub fn record_purchase(&self, buyer_id: AccountId, lines: &[TransactionLine]) -> MarketResult<()> {
        let mut tables = self.inner.write();
        {
            let buyer = tables
                .buyers
                .get_mut(&buyer_id)
                .ok_or_else(|| MarketError::NotFound("buyer_id".to_string()))?;
            for line in lines {
                buyer.items_purchased += u64::from(line.qty);
                buyer.purchases.push(line.item_id);
            }
        }
        for line in lines {
            if let Some(seller) = tables.sellers.get_mut(&line.seller_id) {
                seller.items_sold += u64::from(line.qty);
            }
        }
        Ok(())
    }

    /// Items bought by a buyer, in purchase order
    pub fn purchases(&self, buyer_id: AccountId) -> MarketResult<(u64, Vec<ItemId>)> {
        let buyer = self.buyer(buyer_id)?;
        Ok((buyer.items_purchased, buyer.purchases))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    #[test]
    fn test_ids_are_per_role_and_sequential() {
        let table = AccountTable::new();
        let now = Utc::now();
        assert_eq!(table.create(Role::Buyer, "ann", "pw", now).unwrap(), 1);
        assert_eq!(table.create(Role::Buyer, "bob", "pw", now).unwrap(), 2);
        assert_eq!(table.create(Role::Seller, "ann", "pw", now).unwrap(), 1);
    }

    #[test]
    fn test_name_length_is_validated() {
        let table = AccountTable::new();
        let long = "x".repeat(33);
        assert!(matches!(
            table.create(Role::Buyer, &long, "pw", Utc::now()),
            Err(MarketError::Validation(_))
        ));
        assert!(table.create(Role::Buyer, "", "pw", Utc::now()).is_err());
    }

    #[test]
    fn test_login_by_name_or_id() {
        let table = AccountTable::new();
        let id = table.create(Role::Seller, "shop", "secret", Utc::now()).unwrap();

        assert_eq!(table.authenticate(Role::Seller, "shop", "secret").unwrap(), id);
        assert_eq!(table.authenticate(Role::Seller, "1", "secret").unwrap(), id);
        assert_eq!(
            table.authenticate(Role::Seller, "shop", "wrong"),
            Err(MarketError::InvalidCredentials)
        );
        assert_eq!(
            table.authenticate(Role::Buyer, "shop", "secret"),
            Err(MarketError::InvalidCredentials)
        );
    }

    #[test]
    fn test_names_match_exactly_including_spaces() {
        let table = AccountTable::new();
        let now = Utc::now();
        let padded = table.create(Role::Buyer, " ann", "pw", now).unwrap();
        let trailing = table.create(Role::Buyer, "ann ", "pw", now).unwrap();

        assert_eq!(table.authenticate(Role::Buyer, " ann", "pw").unwrap(), padded);
        assert_eq!(table.authenticate(Role::Buyer, "ann ", "pw").unwrap(), trailing);
        assert_eq!(
            table.authenticate(Role::Buyer, "ann", "pw"),
            Err(MarketError::InvalidCredentials)
        );
        assert_eq!(
            table.authenticate(Role::Buyer, " 1", "pw"),
            Err(MarketError::InvalidCredentials)
        );
    }

    #[test]
    fn test_duplicate_names_resolve_by_password() {
        let table = AccountTable::new();
        let now = Utc::now();
        let a = table.create(Role::Buyer, "sam", "one", now).unwrap();
        let b = table.create(Role::Buyer, "sam", "two", now).unwrap();
        table.create(Role::Buyer, "sam", "two", now).unwrap();

        assert_eq!(table.authenticate(Role::Buyer, "sam", "one").unwrap(), a);
        assert_eq!(
            table.authenticate(Role::Buyer, "sam", "two"),
            Err(MarketError::AmbiguousUsername(Role::Buyer))
        );
        assert_eq!(table.authenticate(Role::Buyer, &b.to_string(), "two").unwrap(), b);
    }

    #[test]
    fn test_purchase_and_vote_accrual() {
        let table = AccountTable::new();
        let now = Utc::now();
        let buyer = table.create(Role::Buyer, "b", "pw", now).unwrap();
        let seller = table.create(Role::Seller, "s", "pw", now).unwrap();

        table.record_vote(seller, Vote::Up).unwrap();
        table.record_vote(seller, Vote::Down).unwrap();
        table.record_vote(seller, Vote::Up).unwrap();
        table
            .record_purchase(
                buyer,
                &[TransactionLine {
                    item_id: ItemId::new(1, 1),
                    seller_id: seller,
                    qty: 3,
                    price_each: dec!(2),
                }],
            )
            .unwrap();

        let rating = table.seller_rating(seller).unwrap();
        assert_eq!(rating.seller_feedback.score(), 1);
        assert_eq!(rating.items_sold, 3);

        let (units, history) = table.purchases(buyer).unwrap();
        assert_eq!(units, 3);
        assert_eq!(history, vec![ItemId::new(1, 1)]);
        assert!(matches!(table.seller_rating(99), Err(MarketError::NotFound(_))));
    }
}
