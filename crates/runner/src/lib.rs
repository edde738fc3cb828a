//! Bazaar Runner
//!
//! Wires the marketplace together from a [`MarketConfig`]:
//!
//! - **Config**: JSON file plus `BAZAAR_*` environment overrides
//! - **Bootstrap**: binds the store and both gateways, optional session sweeper
//!
//! ## Architecture
//!
//! ```text
//!   ┌───────────────┐     ┌────────────────┐
//!   │ Buyer Gateway │     │ Seller Gateway │
//!   │   :5100       │     │   :5200        │
//!   └───────┬───────┘     └───────┬────────┘
//!           │   shared TcpPool    │
//!           └─────────┬───────────┘
//!                     ▼
//!             ┌───────────────┐     ┌──────────────┐
//!             │ Store :5300   │◄────│   Sweeper    │
//!             └───────────────┘     │  (optional)  │
//!                                   └──────────────┘
//! ```

pub mod bootstrap;
pub mod config;

pub use bootstrap::{BootstrapError, MarketSystem};
pub use config::{ConfigError, Endpoint, Features, MarketConfig, PoolSettings, SessionSettings};
