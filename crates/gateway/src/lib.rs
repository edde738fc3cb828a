//! Bazaar Gateway
//!
//! Stateless front doors for the marketplace. Provides:
//! - Transport to the store (`Requester` trait, pooled TCP, in-process)
//! - A typed client for the store's actions
//! - The buyer and seller gateways, each a framed [`Service`]
//!
//! ## Architecture
//!
//! ```text
//!   buyer clients        seller clients
//!        │                     │
//!   ┌────▼─────┐         ┌─────▼────┐
//!   │  Buyer   │         │  Seller  │
//!   │ Gateway  │         │ Gateway  │
//!   └────┬─────┘         └─────┬────┘
//!        │    TcpPool (lazy,   │
//!        │    fixed size)      │
//!        └─────────┬───────────┘
//!             ┌────▼────┐
//!             │  Store  │
//!             └─────────┘
//! ```
//!
//! Neither gateway keeps session or cart state; every authenticated action
//! starts with a `validate_session` round trip.
//!
//! [`Service`]: bazaar_protocol::Service

pub mod actions;
pub mod backend;
pub mod buyer;
pub mod error;
pub mod seller;
pub mod transport;

// Re-export commonly used types
pub use actions::{BuyerAction, SellerAction, normalize_action};
pub use backend::StoreClient;
pub use buyer::BuyerGateway;
pub use error::{GatewayError, TransportError};
pub use seller::SellerGateway;
pub use transport::{LocalRequester, PoolConfig, Requester, TcpPool};
