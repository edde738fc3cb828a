//! Bootstrap - wiring of the store and both gateways
//!
//! Binds the store first, then points the gateways' connection pool at the
//! address the store actually bound, so port 0 works end to end.

use std::net::SocketAddr;
use std::sync::Arc;

use bazaar_gateway::{BuyerGateway, Requester, SellerGateway, TcpPool};
use bazaar_protocol::{FrameServer, Service};
use bazaar_store::{MarketStore, StoreService, spawn_session_sweeper};
use log::info;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::MarketConfig;

#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("Failed to bind {service} on {addr}: {source}")]
    Bind {
        service: &'static str,
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

/// A running marketplace
pub struct MarketSystem {
    store: Arc<MarketStore>,
    store_addr: SocketAddr,
    buyer_addr: SocketAddr,
    seller_addr: SocketAddr,
    shutdown: watch::Sender<bool>,
    servers: Vec<JoinHandle<()>>,
    sweeper: Option<JoinHandle<()>>,
}

impl MarketSystem {
    /// Bind all three services and start serving
    pub async fn start(config: &MarketConfig) -> Result<Self, BootstrapError> {
        let (shutdown, _) = watch::channel(false);
        let mut servers = Vec::with_capacity(3);

        let store = Arc::new(MarketStore::with_system_clock(config.session.timeout()));
        let store_service: Arc<dyn Service> = Arc::new(StoreService::new(Arc::clone(&store)));
        let store_addr = listen(&config.store.addr(), store_service, &shutdown, &mut servers).await?;

        let pool: Arc<dyn Requester> = Arc::new(TcpPool::new(
            store_addr.to_string(),
            config.pool.to_pool_config(),
        ));

        let buyer: Arc<dyn Service> = Arc::new(BuyerGateway::new(
            Arc::clone(&pool),
            config.features.enable_make_purchase,
        ));
        let buyer_addr = listen(&config.buyer_gateway.addr(), buyer, &shutdown, &mut servers).await?;

        let seller: Arc<dyn Service> = Arc::new(SellerGateway::new(pool));
        let seller_addr =
            listen(&config.seller_gateway.addr(), seller, &shutdown, &mut servers).await?;

        let sweeper = config
            .session
            .sweep_interval()
            .map(|every| spawn_session_sweeper(Arc::clone(&store), every));

        info!(
            "Marketplace up: store {}, buyer gateway {}, seller gateway {}",
            store_addr, buyer_addr, seller_addr
        );

        Ok(Self {
            store,
            store_addr,
            buyer_addr,
            seller_addr,
            shutdown,
            servers,
            sweeper,
        })
    }

    pub fn store(&self) -> &Arc<MarketStore> {
        &self.store
    }

    pub fn store_addr(&self) -> SocketAddr {
        self.store_addr
    }

    pub fn buyer_addr(&self) -> SocketAddr {
        self.buyer_addr
    }

    pub fn seller_addr(&self) -> SocketAddr {
        self.seller_addr
    }

    /// Stop accepting, close open connections and wait for the servers to exit
    pub async fn shutdown(self) {
        info!("Shutting down marketplace");
        let _ = self.shutdown.send(true);
        if let Some(sweeper) = self.sweeper {
            sweeper.abort();
        }
        for server in self.servers {
            let _ = server.await;
        }
    }
}

async fn listen(
    addr: &str,
    service: Arc<dyn Service>,
    shutdown: &watch::Sender<bool>,
    servers: &mut Vec<JoinHandle<()>>,
) -> Result<SocketAddr, BootstrapError> {
    let name = service.name();
    let bind_error = |source| BootstrapError::Bind {
        service: name,
        addr: addr.to_string(),
        source,
    };

    let server = FrameServer::bind(addr, service).await.map_err(bind_error)?;
    let local = server.local_addr().map_err(bind_error)?;

    let mut stop = shutdown.subscribe();
    servers.push(tokio::spawn(server.run_until(async move {
        let _ = stop.wait_for(|stopped| *stopped).await;
    })));
    Ok(local)
}
