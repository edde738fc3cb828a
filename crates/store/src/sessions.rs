//! Session table
//!
//! ```text
//!  absent ──create──► active ──logout──► absent
//!                       │
//!                       └──idle >= timeout──► absent
//! ```
//!
//! Each session owns its active cart, so the cart lives and dies with the
//! token. Expiry is lazy: an idle session is removed the next time anything
//! touches it, or by [`SessionTable::sweep_expired`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use bazaar_clock::Clock;
use bazaar_core::{AccountId, Cart, MarketError, MarketResult, Role, Session, SessionToken};
use log::debug;
use parking_lot::Mutex;

/// Shortest idle timeout honoured
pub const MIN_SESSION_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug)]
struct SessionEntry {
    session: Session,
    cart: Cart,
}

pub struct SessionTable {
    entries: Mutex<HashMap<SessionToken, SessionEntry>>,
    clock: Arc<dyn Clock>,
    timeout: Duration,
}

impl SessionTable {
    /// `timeout` is clamped to at least [`MIN_SESSION_TIMEOUT`]
    pub fn new(clock: Arc<dyn Clock>, timeout: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
            timeout: timeout.max(MIN_SESSION_TIMEOUT),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Open a session whose active cart starts as `cart`
    pub fn create(&self, role: Role, principal_id: AccountId, cart: Cart) -> Session {
        let now = self.clock.now();
        let mut entries = self.entries.lock();

        let mut token = SessionToken::generate();
        while entries.contains_key(&token) {
            token = SessionToken::generate();
        }

        let session = Session::new(token.clone(), role, principal_id, now);
        entries.insert(
            token,
            SessionEntry {
                session: session.clone(),
                cart,
            },
        );
        debug!("opened {} session for {}", role, principal_id);
        session
    }

    /// Refresh and return a live session; drop it (and its cart) if idle too long
    pub fn touch_or_expire(&self, token: &SessionToken) -> Option<Session> {
        let now = self.clock.now();
        let mut entries = self.entries.lock();
        live_entry(&mut entries, token, now, self.timeout).map(|entry| entry.session.clone())
    }

    /// Touch the session and run `f` against it and its active cart.
    ///
    /// Fails with [`MarketError::InvalidSession`] when the token is unknown or
    /// has just expired; the two cases are not distinguished.
    pub fn with_session<R>(
        &self,
        token: &SessionToken,
        f: impl FnOnce(&Session, &mut Cart) -> MarketResult<R>,
    ) -> MarketResult<R> {
        let now = self.clock.now();
        let mut entries = self.entries.lock();
        let entry =
            live_entry(&mut entries, token, now, self.timeout).ok_or(MarketError::InvalidSession)?;
        f(&entry.session, &mut entry.cart)
    }

    /// Idempotent removal. Returns whether a session was present.
    pub fn delete(&self, token: &SessionToken) -> bool {
        self.entries.lock().remove(token).is_some()
    }

    /// Remove every idle-expired session; returns how many were dropped
    pub fn sweep_expired(&self) -> usize {
        let now = self.clock.now();
        let timeout = self.timeout;
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| !entry.session.is_expired(now, timeout));
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

fn live_entry<'a>(
    entries: &'a mut HashMap<SessionToken, SessionEntry>,
    token: &SessionToken,
    now: bazaar_core::Timestamp,
    timeout: Duration,
) -> Option<&'a mut SessionEntry> {
    let expired = entries.get(token)?.session.is_expired(now, timeout);
    if expired {
        entries.remove(token);
        debug!("session expired on access");
        return None;
    }
    let entry = entries.get_mut(token)?;
    entry.session.touch(now);
    Some(entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bazaar_clock::ManualClock;
    use bazaar_core::ItemId;

    fn table(timeout_secs: u64) -> (Arc<ManualClock>, SessionTable) {
        let clock = Arc::new(ManualClock::starting_now());
        let table = SessionTable::new(clock.clone(), Duration::from_secs(timeout_secs));
        (clock, table)
    }

    #[test]
    fn test_timeout_is_clamped() {
        let (_, table) = table(0);
        assert_eq!(table.timeout(), MIN_SESSION_TIMEOUT);
    }

    #[test]
    fn test_activity_extends_lifetime() {
        let (clock, table) = table(10);
        let session = table.create(Role::Buyer, 1, Cart::new());

        clock.advance(chrono::Duration::seconds(9));
        assert!(table.touch_or_expire(&session.token).is_some());

        clock.advance(chrono::Duration::seconds(9));
        let touched = table.touch_or_expire(&session.token).unwrap();
        assert_eq!(touched.last_activity, clock.now());
    }

    #[test]
    fn test_idle_session_and_cart_are_dropped() {
        let (clock, table) = table(10);
        let mut cart = Cart::new();
        cart.add(ItemId::new(1, 1), 2).unwrap();
        let session = table.create(Role::Buyer, 1, cart);

        clock.advance(chrono::Duration::seconds(10));
        assert!(table.touch_or_expire(&session.token).is_none());
        assert!(table.is_empty());
        assert_eq!(
            table.with_session(&session.token, |_, _| Ok(())),
            Err(MarketError::InvalidSession)
        );
    }

    #[test]
    fn test_delete_is_idempotent() {
        let (_, table) = table(10);
        let session = table.create(Role::Seller, 3, Cart::new());
        assert!(table.delete(&session.token));
        assert!(!table.delete(&session.token));
        assert!(table.touch_or_expire(&session.token).is_none());
    }

    #[test]
    fn test_sweep_only_removes_idle() {
        let (clock, table) = table(5);
        let stale = table.create(Role::Buyer, 1, Cart::new());
        clock.advance(chrono::Duration::seconds(3));
        let fresh = table.create(Role::Buyer, 2, Cart::new());
        clock.advance(chrono::Duration::seconds(3));

        assert_eq!(table.sweep_expired(), 1);
        assert!(table.touch_or_expire(&stale.token).is_none());
        assert!(table.touch_or_expire(&fresh.token).is_some());
    }

    #[test]
    fn test_sessions_have_independent_carts() {
        let (_, table) = table(60);
        let a = table.create(Role::Buyer, 1, Cart::new());
        let b = table.create(Role::Buyer, 1, Cart::new());

        table
            .with_session(&a.token, |_, cart| cart.add(ItemId::new(1, 1), 1))
            .unwrap();
        let qty_b = table
            .with_session(&b.token, |_, cart| Ok(cart.quantity_of(&ItemId::new(1, 1))))
            .unwrap();
        assert_eq!(qty_b, 0);
    }
}
