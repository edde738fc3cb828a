//! In-process transport
//!
//! Hands requests straight to a [`Service`] with no framing. Behaves like a
//! pool whose backend never drops a connection.

use std::sync::Arc;

use async_trait::async_trait;
use bazaar_protocol::{Request, Response, Service};

use crate::error::TransportError;
use crate::transport::Requester;

pub struct LocalRequester {
    service: Arc<dyn Service>,
}

impl LocalRequester {
    pub fn new(service: Arc<dyn Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Requester for LocalRequester {
    async fn call(&self, req: Request) -> Result<Response, TransportError> {
        Ok(self.service.handle(req).await)
    }
}
