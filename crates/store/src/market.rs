//! The consolidated store
//!
//! [`MarketStore`] owns every table and is the only way to reach them. It is
//! shared by reference (`Arc`) with the RPC service and the session sweeper;
//! there is no global instance. All operations are synchronous: locks are
//! taken and released inside each call and never held across an `.await`.

use std::sync::Arc;
use std::time::Duration;

use bazaar_clock::{Clock, SystemClock};
use bazaar_core::{
    AccountId, Cart, CartLine, Category, Feedback, Item, ItemDraft, ItemId, MarketError, MarketResult,
    Price, Quantity, Role, SellerRating, Session, SessionToken, Transaction, Vote,
};
use log::{debug, info};
use serde::Serialize;

use crate::accounts::AccountTable;
use crate::carts::SavedCarts;
use crate::catalog::Catalog;
use crate::ledger::Ledger;
use crate::sessions::SessionTable;

/// Purchase history view for one buyer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuyerPurchases {
    pub buyer_id: AccountId,
    pub items_purchased: u64,
    pub purchases: Vec<ItemId>,
    pub transactions: Vec<Transaction>,
}

pub struct MarketStore {
    clock: Arc<dyn Clock>,
    accounts: AccountTable,
    sessions: SessionTable,
    saved_carts: SavedCarts,
    catalog: Catalog,
    ledger: Ledger,
}

fn require_role(session: &Session, role: Role) -> MarketResult<()> {
    if session.role != role {
        return Err(MarketError::WrongRole { expected: role });
    }
    Ok(())
}

impl MarketStore {
    pub fn new(clock: Arc<dyn Clock>, session_timeout: Duration) -> Self {
        Self {
            sessions: SessionTable::new(Arc::clone(&clock), session_timeout),
            clock,
            accounts: AccountTable::new(),
            saved_carts: SavedCarts::new(),
            catalog: Catalog::new(),
            ledger: Ledger::new(),
        }
    }

    /// Store on wall-clock time
    pub fn with_system_clock(session_timeout: Duration) -> Self {
        Self::new(Arc::new(SystemClock), session_timeout)
    }

    pub fn session_timeout(&self) -> Duration {
        self.sessions.timeout()
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    // ------------------------------------------------------------------
    // Accounts & sessions
    // ------------------------------------------------------------------

    pub fn create_account(&self, role: Role, name: &str, password: &str) -> MarketResult<AccountId> {
        self.accounts.create(role, name, password, self.clock.now())
    }

    /// Authenticate and open a session. A buyer's active cart starts as a
    /// copy of the saved cart.
    pub fn login(&self, role: Role, username: &str, password: &str) -> MarketResult<Session> {
        let id = self.accounts.authenticate(role, username, password)?;
        let cart = match role {
            Role::Buyer => self.saved_carts.load(id),
            Role::Seller => Cart::new(),
        };
        let session = self.sessions.create(role, id, cart);
        info!("{} {} logged in", role, id);
        Ok(session)
    }

    /// Always succeeds, whether or not the token was live
    pub fn logout(&self, token: &SessionToken) {
        if self.sessions.delete(token) {
            debug!("session closed by logout");
        }
    }

    /// Principal id of a live session with the expected role
    pub fn validate_session(&self, role: Role, token: &SessionToken) -> MarketResult<AccountId> {
        self.sessions.with_session(token, |session, _| {
            require_role(session, role)?;
            Ok(session.principal_id)
        })
    }

    pub fn seller_rating(&self, seller_id: AccountId) -> MarketResult<SellerRating> {
        self.accounts.seller_rating(seller_id)
    }

    pub fn seller_rating_for_session(&self, token: &SessionToken) -> MarketResult<SellerRating> {
        let seller_id = self.validate_session(Role::Seller, token)?;
        self.accounts.seller_rating(seller_id)
    }

    pub fn buyer_purchases(&self, token: &SessionToken) -> MarketResult<BuyerPurchases> {
        let buyer_id = self.validate_session(Role::Buyer, token)?;
        let (items_purchased, purchases) = self.accounts.purchases(buyer_id)?;
        Ok(BuyerPurchases {
            buyer_id,
            items_purchased,
            purchases,
            transactions: self.ledger.for_buyer(buyer_id),
        })
    }

    // ------------------------------------------------------------------
    // Carts (buyer sessions only)
    // ------------------------------------------------------------------

    fn with_buyer_cart<R>(
        &self,
        token: &SessionToken,
        f: impl FnOnce(AccountId, &mut Cart) -> MarketResult<R>,
    ) -> MarketResult<R> {
        self.sessions.with_session(token, |session, cart| {
            require_role(session, Role::Buyer)?;
            f(session.principal_id, cart)
        })
    }

    pub fn cart(&self, token: &SessionToken) -> MarketResult<Vec<CartLine>> {
        self.with_buyer_cart(token, |_, cart| Ok(cart.lines()))
    }

    /// Add to the active cart. Stock is not checked here; the buyer gateway
    /// compares against current inventory before calling.
    pub fn cart_add(&self, token: &SessionToken, item_id: ItemId, qty: Quantity) -> MarketResult<Vec<CartLine>> {
        self.with_buyer_cart(token, |_, cart| {
            cart.add(item_id, qty)?;
            Ok(cart.lines())
        })
    }

    pub fn cart_remove(&self, token: &SessionToken, item_id: ItemId, qty: Quantity) -> MarketResult<Vec<CartLine>> {
        self.with_buyer_cart(token, |_, cart| {
            cart.remove(item_id, qty)?;
            Ok(cart.lines())
        })
    }

    pub fn cart_clear(&self, token: &SessionToken) -> MarketResult<()> {
        self.with_buyer_cart(token, |_, cart| {
            cart.clear();
            Ok(())
        })
    }

    /// Snapshot the active cart into the buyer's saved slot
    pub fn cart_save(&self, token: &SessionToken) -> MarketResult<Vec<CartLine>> {
        self.with_buyer_cart(token, |buyer_id, cart| {
            self.saved_carts.save(buyer_id, cart);
            Ok(cart.lines())
        })
    }

    // ------------------------------------------------------------------
    // Catalog
    // ------------------------------------------------------------------

    pub fn register_item(&self, seller_id: AccountId, draft: ItemDraft) -> MarketResult<Item> {
        if !self.accounts.exists(Role::Seller, seller_id) {
            return Err(MarketError::NotFound("seller_id".to_string()));
        }
        self.catalog.register(seller_id, draft, self.clock.now())
    }

    pub fn change_item_price(&self, seller_id: AccountId, item_id: &ItemId, price: Price) -> MarketResult<()> {
        self.catalog.change_price(seller_id, item_id, price)
    }

    pub fn remove_units(&self, seller_id: AccountId, item_id: &ItemId, qty: Quantity) -> MarketResult<Quantity> {
        self.catalog.remove_units(seller_id, item_id, qty)
    }

    pub fn items_for_seller(&self, seller_id: AccountId) -> Vec<Item> {
        self.catalog.list_for_seller(seller_id)
    }

    pub fn item(&self, item_id: &ItemId) -> MarketResult<Item> {
        self.catalog.get(item_id)
    }

    /// Vote on an item; the owning seller's rating moves with it
    pub fn provide_feedback(&self, item_id: &ItemId, vote: Vote) -> MarketResult<Feedback> {
        let (feedback, seller_id) = self.catalog.vote(item_id, vote)?;
        self.accounts.record_vote(seller_id, vote)?;
        Ok(feedback)
    }

    pub fn search(&self, category: Category, keywords: &[String]) -> MarketResult<Vec<Item>> {
        self.catalog.search(category, keywords)
    }

    // ------------------------------------------------------------------
    // Checkout
    // ------------------------------------------------------------------

    /// Buy everything in the session's active cart
    ///
    /// The cart is emptied in the same session lock that reads it, so two
    /// concurrent purchases on one session cannot both check out the same
    /// lines. If checkout fails the lines go back into the cart.
    pub fn make_purchase(&self, token: &SessionToken) -> MarketResult<Transaction> {
        let (buyer_id, wanted) = self.with_buyer_cart(token, |buyer_id, cart| {
            let lines = cart.lines();
            cart.clear();
            Ok((buyer_id, lines))
        })?;
        if wanted.is_empty() {
            return Err(MarketError::validation("cart is empty"));
        }

        let (lines, total) = match self.catalog.checkout(&wanted) {
            Ok(priced) => priced,
            Err(e) => {
                self.restore_cart(token, &wanted);
                return Err(e);
            }
        };
        self.accounts.record_purchase(buyer_id, &lines)?;

        let txn = Transaction::new(buyer_id, lines, total, self.clock.now());
        info!(
            "buyer {} purchased {} units for {} (txn {})",
            buyer_id,
            txn.units(),
            txn.total,
            txn.txn_id
        );
        self.ledger.record(txn.clone());
        Ok(txn)
    }

    fn restore_cart(&self, token: &SessionToken, lines: &[CartLine]) {
        let restored = self.sessions.with_session(token, |_, cart| {
            for line in lines {
                cart.add(line.item_id, line.quantity)?;
            }
            Ok(())
        });
        if let Err(e) = restored {
            debug!("could not restore cart after failed checkout: {}", e);
        }
    }

    /// Drop every idle-expired session and its active cart
    pub fn sweep_expired_sessions(&self) -> usize {
        let removed = self.sessions.sweep_expired();
        if removed > 0 {
            info!("swept {} expired sessions", removed);
        }
        removed
    }
}
