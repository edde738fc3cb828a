//! Buyer front door
//!
//! ```text
//! client ──► BuyerGateway ──validate_session──► store
//!                 │
//!                 └──── one or more store calls per action ──► store
//! ```
//!
//! Holds no session or cart state. Every action other than account creation,
//! login and logout is preceded by a `validate_session` round trip.

use std::sync::Arc;

use async_trait::async_trait;
use bazaar_core::{CartLine, Item, MarketError, Role, SessionToken, Vote};
use bazaar_protocol::{Params, Request, Response, Service, store_actions as actions};
use log::debug;
use serde_json::{Map, Value, json};

use crate::actions::BuyerAction;
use crate::backend::{StoreClient, decode};
use crate::error::GatewayError;
use crate::transport::Requester;

const ITEM_KEYS: &[&str] = &["item_id", "item_key"];
const QTY_KEYS: &[&str] = &["quantity", "qty"];

pub struct BuyerGateway {
    store: StoreClient,
    enable_make_purchase: bool,
}

impl BuyerGateway {
    pub fn new(requester: Arc<dyn Requester>, enable_make_purchase: bool) -> Self {
        Self {
            store: StoreClient::new(requester),
            enable_make_purchase,
        }
    }

    async fn dispatch(&self, req: &Request) -> Result<Map<String, Value>, GatewayError> {
        let action = BuyerAction::parse(&req.action)?;
        let p = Params::new(&req.data);

        if action.needs_session() {
            let token = p.session_token()?;
            self.store.validate_session(Role::Buyer, &token).await?;
            return self.session_action(action, p, &token).await;
        }

        match action {
            BuyerAction::CreateAccount => {
                let username = p.text_any(&["username", "buyer_name"])?;
                let password = p.str("password")?;
                self.store
                    .create_account(Role::Buyer, &username, password)
                    .await
            }
            BuyerAction::Login => {
                let username = p.text_any(&["username", "buyer_name", "buyer_id"])?;
                let password = p.str("password")?;
                self.store.login(Role::Buyer, &username, password).await
            }
            BuyerAction::Logout => self.store.logout(&p.session_token()?).await,
            action => Err(
                MarketError::Internal(format!("{:?} was not routed to a session", action)).into(),
            ),
        }
    }

    async fn session_action(
        &self,
        action: BuyerAction,
        p: Params<'_>,
        token: &SessionToken,
    ) -> Result<Map<String, Value>, GatewayError> {
        let store = &self.store;
        match action {
            BuyerAction::SearchItemsForSale => {
                let category = p.int_any(&["item_category", "category"])?;
                let keywords = p.keywords("keywords")?;
                store
                    .call(
                        actions::SEARCH,
                        json!({ "category": category, "keywords": keywords }),
                    )
                    .await
            }
            BuyerAction::GetItem => {
                let item_id = p.item_id_any(ITEM_KEYS)?;
                store
                    .call(actions::GET_ITEM, json!({ "item_id": item_id }))
                    .await
            }
            BuyerAction::AddItemToCart => self.add_to_cart(p, token).await,
            BuyerAction::RemoveItemFromCart => {
                let item_id = p.item_id_any(ITEM_KEYS)?;
                let qty = p.positive_quantity(QTY_KEYS)?;
                store
                    .call(
                        actions::CART_REMOVE,
                        json!({ "session_token": token, "item_id": item_id, "qty": qty }),
                    )
                    .await
            }
            BuyerAction::SaveCart => {
                store
                    .call(actions::CART_SAVE, json!({ "session_token": token }))
                    .await
            }
            BuyerAction::ClearCart => {
                store
                    .call(actions::CART_CLEAR, json!({ "session_token": token }))
                    .await
            }
            BuyerAction::DisplayCart => {
                store
                    .call(actions::CART_GET, json!({ "session_token": token }))
                    .await
            }
            BuyerAction::ProvideFeedback => {
                let item_id = p.item_id_any(ITEM_KEYS)?;
                let vote: Vote = p.text_any(&["vote", "feedback"])?.parse()?;
                store
                    .call(
                        actions::PROVIDE_FEEDBACK,
                        json!({ "item_id": item_id, "vote": vote }),
                    )
                    .await
            }
            BuyerAction::GetSellerRating => {
                let seller_id = p.id("seller_id")?;
                store
                    .call(actions::GET_SELLER_RATING, json!({ "seller_id": seller_id }))
                    .await
            }
            BuyerAction::GetBuyerPurchases => {
                store
                    .call(actions::GET_BUYER_PURCHASES, json!({ "session_token": token }))
                    .await
            }
            BuyerAction::MakePurchase => {
                if !self.enable_make_purchase {
                    return Err(MarketError::FeatureDisabled("make_purchase".into()).into());
                }
                store
                    .call(actions::MAKE_PURCHASE, json!({ "session_token": token }))
                    .await
            }
            BuyerAction::CreateAccount | BuyerAction::Login | BuyerAction::Logout => Err(
                MarketError::Internal(format!("{:?} does not run under a session", action)).into(),
            ),
        }
    }

    /// get_item, then cart_get, then the bound check, then cart_add.
    ///
    /// The check and the commit are separate round trips: two concurrent adds
    /// for the same buyer can both pass the check. Checkout re-validates stock.
    async fn add_to_cart(
        &self,
        p: Params<'_>,
        token: &SessionToken,
    ) -> Result<Map<String, Value>, GatewayError> {
        let item_id = p.item_id_any(ITEM_KEYS)?;
        let qty = p.positive_quantity(QTY_KEYS)?;

        let data = self
            .store
            .call(actions::GET_ITEM, json!({ "item_id": item_id }))
            .await?;
        let item: Item = decode(&data, "item")?;

        let data = self
            .store
            .call(actions::CART_GET, json!({ "session_token": token }))
            .await?;
        let cart: Vec<CartLine> = decode(&data, "cart")?;
        let in_cart = cart
            .iter()
            .find(|line| line.item_id == item_id)
            .map_or(0, |line| line.quantity);

        let requested = u64::from(in_cart) + u64::from(qty);
        if requested > u64::from(item.quantity) {
            return Err(MarketError::InsufficientInventory {
                item: item_id,
                requested,
                available: item.quantity,
            }
            .into());
        }

        self.store
            .call(
                actions::CART_ADD,
                json!({ "session_token": token, "item_id": item_id, "qty": qty }),
            )
            .await
    }
}

#[async_trait]
impl Service for BuyerGateway {
    fn name(&self) -> &'static str {
        "buyer-gateway"
    }

    async fn handle(&self, req: Request) -> Response {
        match self.dispatch(&req).await {
            Ok(data) => Response::ok(req.req_id, data),
            Err(e) => {
                debug!("buyer action '{}' failed: {}", req.action, e);
                Response::failure(req.req_id, e.to_body())
            }
        }
    }
}
