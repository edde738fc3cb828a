//! Fixed-size pool of framed TCP connections to the store
//!
//! At most `size` calls are in flight at once. Connections are opened lazily
//! on first checkout and handed back after a clean exchange; a connection that
//! errors or times out is dropped, and the next checkout dials a fresh one.

use std::time::Duration;

use async_trait::async_trait;
use bazaar_protocol::{Request, Response, read_frame, write_frame};
use log::{debug, warn};
use parking_lot::Mutex;
use tokio::net::TcpStream;
use tokio::sync::Semaphore;
use tokio::time::timeout;

use crate::error::TransportError;
use crate::transport::Requester;

/// Pool sizing and deadlines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    /// Maximum concurrent connections (at least 1)
    pub size: usize,
    /// Deadline for connect + request + response
    pub call_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            size: 4,
            call_timeout: Duration::from_secs(5),
        }
    }
}

pub struct TcpPool {
    addr: String,
    permits: Semaphore,
    idle: Mutex<Vec<TcpStream>>,
    config: PoolConfig,
}

impl TcpPool {
    pub fn new(addr: impl Into<String>, config: PoolConfig) -> Self {
        let config = PoolConfig {
            size: config.size.max(1),
            ..config
        };
        Self {
            addr: addr.into(),
            permits: Semaphore::new(config.size),
            idle: Mutex::new(Vec::with_capacity(config.size)),
            config,
        }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    pub fn config(&self) -> PoolConfig {
        self.config
    }

    /// Connections currently parked in the pool
    pub fn idle_connections(&self) -> usize {
        self.idle.lock().len()
    }

    async fn checkout(&self) -> Result<TcpStream, TransportError> {
        let parked = self.idle.lock().pop();
        match parked {
            Some(stream) => Ok(stream),
            None => {
                debug!("opening store connection to {}", self.addr);
                let stream = TcpStream::connect(&self.addr)
                    .await
                    .map_err(TransportError::Connection)?;
                let _ = stream.set_nodelay(true);
                Ok(stream)
            }
        }
    }

    fn checkin(&self, stream: TcpStream) {
        self.idle.lock().push(stream);
    }

    async fn exchange(&self, req: &Request) -> Result<(TcpStream, Response), TransportError> {
        let mut stream = self.checkout().await?;
        write_frame(&mut stream, req).await?;
        let resp: Response = read_frame(&mut stream)
            .await?
            .ok_or(TransportError::Closed)?;
        Ok((stream, resp))
    }
}

#[async_trait]
impl Requester for TcpPool {
    async fn call(&self, req: Request) -> Result<Response, TransportError> {
        // The semaphore is never closed
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| TransportError::Closed)?;

        let outcome = match timeout(self.config.call_timeout, self.exchange(&req)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout),
        };

        match outcome {
            Ok((stream, resp)) if resp.req_id == req.req_id => {
                self.checkin(stream);
                Ok(resp)
            }
            Ok((_, resp)) => {
                warn!("dropping store connection: req_id mismatch");
                Err(TransportError::ReqIdMismatch {
                    expected: req.req_id,
                    got: resp.req_id,
                })
            }
            Err(e) => {
                debug!("dropping store connection after {}: {}", req.action, e);
                Err(e)
            }
        }
    }
}
