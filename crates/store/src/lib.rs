//! Bazaar Store
//!
//! The single source of truth for marketplace state, served over the framed
//! RPC protocol. Gateways hold no state of their own; everything they know
//! comes from here.
//!
//! ## Layout
//!
//! ```text
//!              ┌──────────────────── MarketStore ─────────────────────┐
//!  framed RPC  │  AccountTable   buyers / sellers / name index        │
//! ───────────► │  SessionTable   token -> (Session, active Cart)      │
//! StoreService │  SavedCarts     buyer -> saved Cart                  │
//!              │  Catalog        ItemId -> Item, per-category counter │
//!              │  Ledger         Transactions                         │
//!              └──────────────────────────────────────────────────────┘
//!                         ▲
//!                         └── session sweeper (optional, periodic)
//! ```
//!
//! Each table is its own exclusion domain. No lock is held across an
//! `.await`; every store operation is synchronous.

pub mod accounts;
pub mod carts;
pub mod catalog;
pub mod ledger;
pub mod market;
pub mod search;
pub mod service;
pub mod sessions;
pub mod sweeper;

pub use accounts::AccountTable;
pub use carts::SavedCarts;
pub use catalog::Catalog;
pub use ledger::Ledger;
pub use market::{BuyerPurchases, MarketStore};
pub use service::StoreService;
pub use sessions::{MIN_SESSION_TIMEOUT, SessionTable};
pub use sweeper::spawn_session_sweeper;
