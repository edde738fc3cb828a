//! Gateways served over TCP, reaching the store through a `TcpPool`

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bazaar_core::ItemId;
use bazaar_gateway::{BuyerGateway, PoolConfig, Requester, SellerGateway, TcpPool};
use bazaar_protocol::{FrameServer, Request, Response, Service, read_frame, write_frame};
use bazaar_store::{MarketStore, StoreService};
use serde_json::{Map, Value, json};
use tokio::net::TcpStream;
use tokio::sync::watch;

struct Deployment {
    store: Arc<MarketStore>,
    pool: Arc<TcpPool>,
    buyer_addr: SocketAddr,
    seller_addr: SocketAddr,
    stop: watch::Sender<bool>,
}

async fn serve(service: Arc<dyn Service>, stop: &watch::Sender<bool>) -> SocketAddr {
    let server = FrameServer::bind("127.0.0.1:0", service).await.unwrap();
    let addr = server.local_addr().unwrap();
    let mut rx = stop.subscribe();
    tokio::spawn(server.run_until(async move {
        let _ = rx.wait_for(|stopped| *stopped).await;
    }));
    addr
}

impl Deployment {
    async fn start() -> Self {
        let _ = env_logger::try_init();
        let (stop, _) = watch::channel(false);

        let store = Arc::new(MarketStore::with_system_clock(Duration::from_secs(300)));
        let store_addr = serve(Arc::new(StoreService::new(store.clone())), &stop).await;

        let pool = Arc::new(TcpPool::new(
            store_addr.to_string(),
            PoolConfig {
                size: 2,
                call_timeout: Duration::from_secs(2),
            },
        ));
        let requester: Arc<dyn Requester> = pool.clone();
        let buyer_addr = serve(Arc::new(BuyerGateway::new(requester.clone(), true)), &stop).await;
        let seller_addr = serve(Arc::new(SellerGateway::new(requester)), &stop).await;

        Self {
            store,
            pool,
            buyer_addr,
            seller_addr,
            stop,
        }
    }
}

impl Drop for Deployment {
    fn drop(&mut self) {
        let _ = self.stop.send(true);
    }
}

struct Client {
    stream: TcpStream,
    next_id: u64,
}

impl Client {
    async fn connect(addr: SocketAddr) -> Self {
        Self {
            stream: TcpStream::connect(addr).await.unwrap(),
            next_id: 0,
        }
    }

    async fn call(&mut self, action: &str, data: Value) -> Response {
        self.next_id += 1;
        let data = match data {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        let req = Request::new(format!("c{}", self.next_id), action, data);
        write_frame(&mut self.stream, &req).await.unwrap();
        let resp: Response = read_frame(&mut self.stream).await.unwrap().unwrap();
        assert_eq!(resp.req_id, format!("c{}", self.next_id));
        resp
    }

    async fn ok(&mut self, action: &str, data: Value) -> Map<String, Value> {
        let resp = self.call(action, data).await;
        assert!(resp.ok, "{} failed: {:?}", action, resp.error);
        resp.data
    }
}

async fn stocked_item(d: &Deployment, units: i64) -> Client {
    let mut seller = Client::connect(d.seller_addr).await;
    seller
        .ok("create_account", json!({"username": "shop", "password": "pw"}))
        .await;
    let login = seller
        .ok("login", json!({"username": "shop", "password": "pw"}))
        .await;
    seller
        .ok(
            "register_item_for_sale",
            json!({
                "session_token": login["session_token"],
                "attrs": {
                    "item_name": "Last one",
                    "item_category": 9,
                    "condition": "used",
                    "sale_price": 15,
                    "item_quantity": units
                }
            }),
        )
        .await;
    seller
}

async fn buyer_token(client: &mut Client) -> String {
    client
        .ok("CreateAccount", json!({"username": "ann", "password": "pw"}))
        .await;
    let login = client
        .ok("Login", json!({"username": "ann", "password": "pw"}))
        .await;
    login["session_token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_full_flow_over_tcp() {
    let d = Deployment::start().await;
    let _seller = stocked_item(&d, 3).await;

    let mut buyer = Client::connect(d.buyer_addr).await;
    let token = buyer_token(&mut buyer).await;

    let data = buyer
        .ok(
            "search_items_for_sale",
            json!({"session_token": token, "item_category": 9, "keywords": ["last"]}),
        )
        .await;
    assert_eq!(data["items"].as_array().unwrap().len(), 1);

    buyer
        .ok(
            "add_item_to_cart",
            json!({"session_token": token, "item_id": "9:1", "quantity": 3}),
        )
        .await;
    let data = buyer.ok("make_purchase", json!({"session_token": token})).await;
    assert_eq!(data["transaction"]["total"], 45.0);

    let data = buyer.ok("display_cart", json!({"session_token": token})).await;
    assert_eq!(data["cart"], json!([]));
    assert_eq!(d.store.item(&ItemId::new(9, 1)).unwrap().quantity, 0);

    // Connections were opened lazily and never beyond the pool size
    assert!(d.pool.idle_connections() <= 2);
}

#[tokio::test]
async fn test_business_errors_keep_gateway_connection_open() {
    let d = Deployment::start().await;
    let mut buyer = Client::connect(d.buyer_addr).await;

    let resp = buyer.call("teleport", json!({})).await;
    assert!(!resp.ok);
    let resp = buyer
        .call("login", json!({"username": "ghost", "password": "pw"}))
        .await;
    assert!(!resp.ok);

    let token = buyer_token(&mut buyer).await;
    buyer.ok("display_cart", json!({"session_token": token})).await;
}

/// Two adds race on an item with one unit. The gateway check is best effort,
/// so both may land in the cart; checkout must still never oversell.
#[tokio::test]
async fn test_concurrent_adds_never_oversell() {
    let d = Deployment::start().await;
    let _seller = stocked_item(&d, 1).await;

    let mut setup = Client::connect(d.buyer_addr).await;
    let token = buyer_token(&mut setup).await;

    let mut first = Client::connect(d.buyer_addr).await;
    let mut second = Client::connect(d.buyer_addr).await;
    let add = json!({"session_token": token, "item_id": "9:1", "quantity": 1});
    let (a, b) = tokio::join!(
        first.call("add_item_to_cart", add.clone()),
        second.call("add_item_to_cart", add.clone())
    );
    assert!(a.ok || b.ok, "at least one add must pass the stock check");

    let cart = setup.ok("display_cart", json!({"session_token": token})).await;
    let in_cart = cart["cart"][0]["quantity"].as_u64().unwrap();
    assert!((1..=2).contains(&in_cart));

    let purchase = setup.call("make_purchase", json!({"session_token": token})).await;
    let left = d.store.item(&ItemId::new(9, 1)).unwrap().quantity;
    let history = setup
        .ok("get_buyer_purchases", json!({"session_token": token}))
        .await;
    let bought = history["items_purchased"].as_u64().unwrap();

    assert_eq!(u64::from(left) + bought, 1, "units are conserved");
    if in_cart == 1 {
        assert!(purchase.ok);
        assert_eq!(left, 0);
    } else {
        assert!(!purchase.ok);
        assert_eq!(left, 1, "a failed checkout leaves stock untouched");
    }
}
