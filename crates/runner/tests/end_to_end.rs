//! Boots the whole marketplace on ephemeral ports and drives it as a client

use std::net::SocketAddr;

use bazaar_core::ErrorCode;
use bazaar_protocol::{Request, Response, read_frame, write_frame};
use bazaar_runner::{Endpoint, MarketConfig, MarketSystem};
use serde_json::{Map, Value, json};
use tokio::net::TcpStream;

fn ephemeral_config(enable_make_purchase: bool) -> MarketConfig {
    let mut config = MarketConfig::default();
    config.store = Endpoint::new("127.0.0.1", 0);
    config.buyer_gateway = Endpoint::new("127.0.0.1", 0);
    config.seller_gateway = Endpoint::new("127.0.0.1", 0);
    config.session.sweep_interval_secs = Some(1);
    config.features.enable_make_purchase = enable_make_purchase;
    config
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
        let req = Request::new(self.next_id.to_string(), action, data).with_role("client");
        write_frame(&mut self.stream, &req).await.unwrap();
        read_frame(&mut self.stream).await.unwrap().unwrap()
    }

    async fn ok(&mut self, action: &str, data: Value) -> Map<String, Value> {
        let resp = self.call(action, data).await;
        assert!(resp.ok, "{} failed: {:?}", action, resp.error);
        resp.data
    }
}

#[tokio::test]
async fn test_marketplace_round_trip() {
    let _ = env_logger::try_init();
    let system = MarketSystem::start(&ephemeral_config(true)).await.unwrap();
    assert_ne!(system.buyer_addr().port(), 0);

    let mut seller = Client::connect(system.seller_addr()).await;
    seller
        .ok("CreateAccount", json!({"username": "crafts", "password": "s3cret"}))
        .await;
    let login = seller
        .ok("Login", json!({"username": "crafts", "password": "s3cret"}))
        .await;
    let seller_token = login["session_token"].clone();

    let data = seller
        .ok(
            "RegisterItemForSale",
            json!({
                "session_token": seller_token,
                "item_name": "Oak stool",
                "item_category": 4,
                "keywords": ["oak", "stool"],
                "condition": "new",
                "sale_price": 35.25,
                "item_quantity": 2
            }),
        )
        .await;
    assert_eq!(data["item_id"], json!({"category": 4, "number": 1}));

    let mut buyer = Client::connect(system.buyer_addr()).await;
    buyer
        .ok("CreateAccount", json!({"username": "dee", "password": "pw"}))
        .await;
    let login = buyer
        .ok("Login", json!({"username": "dee", "password": "pw"}))
        .await;
    let buyer_token = login["session_token"].clone();

    let found = buyer
        .ok(
            "SearchItemsForSale",
            json!({"session_token": buyer_token, "item_category": 4, "keywords": "OAK"}),
        )
        .await;
    assert_eq!(found["items"][0]["item_name"], "Oak stool");

    buyer
        .ok(
            "AddItemToCart",
            json!({"session_token": buyer_token, "item_id": "4:1", "quantity": 2}),
        )
        .await;
    let data = buyer
        .ok("MakePurchase", json!({"session_token": buyer_token}))
        .await;
    assert_eq!(data["transaction"]["total"], 70.5);

    let resp = buyer
        .call(
            "AddItemToCart",
            json!({"session_token": buyer_token, "item_id": "4:1", "quantity": 1}),
        )
        .await;
    assert_eq!(resp.error.unwrap().code, ErrorCode::InsufficientInventory);

    buyer
        .ok(
            "ProvideFeedback",
            json!({"session_token": buyer_token, "item_id": "4:1", "vote": "up"}),
        )
        .await;
    let rating = seller
        .ok("GetSellerRating", json!({"session_token": seller_token}))
        .await;
    assert_eq!(rating["items_sold"], 2);
    assert_eq!(rating["seller_feedback"], json!({"thumbs_up": 1, "thumbs_down": 0}));

    buyer.ok("Logout", json!({"session_token": buyer_token})).await;
    let resp = buyer
        .call("DisplayCart", json!({"session_token": buyer_token}))
        .await;
    assert_eq!(resp.error.unwrap().code, ErrorCode::InvalidSession);

    let buyer_addr = system.buyer_addr();
    system.shutdown().await;
    assert!(TcpStream::connect(buyer_addr).await.is_err());
}

#[tokio::test]
async fn test_make_purchase_disabled_by_default() {
    let _ = env_logger::try_init();
    let system = MarketSystem::start(&ephemeral_config(false)).await.unwrap();

    let mut buyer = Client::connect(system.buyer_addr()).await;
    buyer
        .ok("create_account", json!({"username": "dee", "password": "pw"}))
        .await;
    let login = buyer
        .ok("login", json!({"username": "dee", "password": "pw"}))
        .await;

    let resp = buyer
        .call("make_purchase", json!({"session_token": login["session_token"]}))
        .await;
    assert_eq!(resp.error.unwrap().code, ErrorCode::FeatureDisabled);

    // The store itself always supports checkout
    let mut store = Client::connect(system.store_addr()).await;
    let resp = store
        .call("make_purchase", json!({"session_token": login["session_token"]}))
        .await;
    assert_eq!(resp.error.unwrap().code, ErrorCode::ValidationError);

    system.shutdown().await;
}

#[tokio::test]
async fn test_port_conflict_is_bind_error() {
    let _ = env_logger::try_init();
    let first = MarketSystem::start(&ephemeral_config(false)).await.unwrap();

    let mut config = ephemeral_config(false);
    config.seller_gateway = Endpoint::new("127.0.0.1", first.store_addr().port());
    let err = MarketSystem::start(&config).await.err().unwrap();
    assert!(err.to_string().contains("seller-gateway"));

    first.shutdown().await;
}
