//! Transport abstraction layer
//!
//! The gateways reach the store through a [`Requester`]. [`TcpPool`] is the
//! production transport; [`LocalRequester`] calls a [`Service`] in-process
//! and is used for single-process wiring and tests.
//!
//! [`Service`]: bazaar_protocol::Service

pub mod local;
pub mod pool;

pub use local::LocalRequester;
pub use pool::{PoolConfig, TcpPool};

use crate::error::TransportError;
use async_trait::async_trait;
use bazaar_protocol::{Request, Response};

/// Request/Reply with the store
#[async_trait]
pub trait Requester: Send + Sync {
    /// Send a request and wait for its response
    async fn call(&self, req: Request) -> Result<Response, TransportError>;
}
