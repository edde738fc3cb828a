//! Framed TCP server
//!
//! One task per accepted connection. Each connection is a strict
//! request → response loop: a frame is read, handed to the [`Service`], and the
//! reply is written before the next frame is read. A [`ProtocolError`] ends the
//! connection; business errors are ordinary responses.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info, warn};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::select;
use tokio::task::JoinSet;

use crate::envelope::{Request, Response};
use crate::error::ProtocolError;
use crate::frame::{read_frame, write_frame};

/// Something that answers framed requests
#[async_trait]
pub trait Service: Send + Sync + 'static {
    /// Short name used in log lines
    fn name(&self) -> &'static str;

    /// Answer one request. Never fails: every error becomes a response.
    async fn handle(&self, req: Request) -> Response;
}

/// Accept loop bound to a listener
pub struct FrameServer {
    listener: TcpListener,
    service: Arc<dyn Service>,
}

impl FrameServer {
    pub async fn bind<A: ToSocketAddrs>(addr: A, service: Arc<dyn Service>) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let server = Self::new(listener, service);
        if let Ok(addr) = server.local_addr() {
            info!("{} listening on {}", server.service.name(), addr);
        }
        Ok(server)
    }

    pub fn new(listener: TcpListener, service: Arc<dyn Service>) -> Self {
        Self { listener, service }
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serve connections until `shutdown` resolves, then abort open connections
    pub async fn run_until<F>(self, shutdown: F)
    where
        F: Future<Output = ()> + Send,
    {
        let FrameServer { listener, service } = self;
        let name = service.name();
        tokio::pin!(shutdown);
        let mut connections = JoinSet::new();

        loop {
            select! {
                _ = &mut shutdown => {
                    info!("{} shutting down ({} open connections)", name, connections.len());
                    break;
                }
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        spawn_connection(&mut connections, stream, peer, Arc::clone(&service));
                    }
                    Err(e) => warn!("{} failed to accept connection: {}", name, e),
                },
                Some(_) = connections.join_next(), if !connections.is_empty() => {}
            }
        }

        connections.shutdown().await;
    }
}

fn spawn_connection(
    connections: &mut JoinSet<()>,
    stream: TcpStream,
    peer: SocketAddr,
    service: Arc<dyn Service>,
) {
    let _ = stream.set_nodelay(true);
    debug!("{} accepted connection from {}", service.name(), peer);
    connections.spawn(async move {
        match serve_connection(stream, service.as_ref()).await {
            Ok(()) => debug!("{} connection from {} closed", service.name(), peer),
            Err(e) => warn!("{} closing connection from {}: {}", service.name(), peer, e),
        }
    });
}

/// Run the request/response loop over one byte stream.
///
/// Returns `Ok(())` when the peer closes cleanly between frames.
pub async fn serve_connection<IO>(mut io: IO, service: &dyn Service) -> Result<(), ProtocolError>
where
    IO: AsyncRead + AsyncWrite + Unpin,
{
    while let Some(req) = read_frame::<_, Request>(&mut io).await? {
        let resp = service.handle(req).await;
        write_frame(&mut io, &resp).await?;
    }
    Ok(())
}
