//! Seller front door
//!
//! The seller id used for ownership checks always comes from the validated
//! session, never from the request body.

use std::sync::Arc;

use async_trait::async_trait;
use bazaar_core::{AccountId, MarketError, Role, SessionToken};
use bazaar_protocol::{Params, Request, Response, Service, store_actions as actions};
use log::debug;
use serde_json::{Map, Value, json};

use crate::actions::SellerAction;
use crate::backend::StoreClient;
use crate::error::GatewayError;
use crate::transport::Requester;

const ITEM_KEYS: &[&str] = &["item_id", "item_key"];
const QTY_KEYS: &[&str] = &["quantity", "qty"];

/// Store attribute name and the request keys it may arrive under
const LISTING_FIELDS: &[(&str, &[&str])] = &[
    ("item_name", &["item_name", "name"]),
    ("item_category", &["item_category", "category"]),
    ("condition", &["condition"]),
    ("sale_price", &["sale_price", "price"]),
    ("item_quantity", &["item_quantity", "quantity"]),
];

pub struct SellerGateway {
    store: StoreClient,
}

impl SellerGateway {
    pub fn new(requester: Arc<dyn Requester>) -> Self {
        Self {
            store: StoreClient::new(requester),
        }
    }

    async fn dispatch(&self, req: &Request) -> Result<Map<String, Value>, GatewayError> {
        let action = SellerAction::parse(&req.action)?;
        let p = Params::new(&req.data);

        if action.needs_session() {
            let token = p.session_token()?;
            let seller_id = self.store.validate_session(Role::Seller, &token).await?;
            return self.session_action(action, p, &token, seller_id).await;
        }

        match action {
            SellerAction::CreateAccount => {
                let username = p.text_any(&["username", "seller_name"])?;
                let password = p.str("password")?;
                self.store
                    .create_account(Role::Seller, &username, password)
                    .await
            }
            SellerAction::Login => {
                let username = p.text_any(&["username", "seller_name", "seller_id"])?;
                let password = p.str("password")?;
                self.store.login(Role::Seller, &username, password).await
            }
            SellerAction::Logout => self.store.logout(&p.session_token()?).await,
            action => Err(
                MarketError::Internal(format!("{:?} was not routed to a session", action)).into(),
            ),
        }
    }

    async fn session_action(
        &self,
        action: SellerAction,
        p: Params<'_>,
        token: &SessionToken,
        seller_id: AccountId,
    ) -> Result<Map<String, Value>, GatewayError> {
        let store = &self.store;
        match action {
            SellerAction::GetSellerRating => {
                store
                    .call(
                        actions::GET_SELLER_RATING_BY_SESSION,
                        json!({ "session_token": token }),
                    )
                    .await
            }
            SellerAction::RegisterItemForSale => {
                let attrs = listing_attrs(p)?;
                store
                    .call(
                        actions::REGISTER_ITEM,
                        json!({ "seller_id": seller_id, "attrs": attrs }),
                    )
                    .await
            }
            SellerAction::ChangeItemPrice => {
                let item_id = p.item_id_any(ITEM_KEYS)?;
                let price = if p.has("new_price") {
                    p.decimal("new_price")?
                } else {
                    p.decimal("sale_price")?
                };
                store
                    .call(
                        actions::CHANGE_ITEM_PRICE,
                        json!({
                            "seller_id": seller_id,
                            "item_id": item_id,
                            "new_price": price.to_string(),
                        }),
                    )
                    .await
            }
            SellerAction::UpdateUnitsForSale => {
                let item_id = p.item_id_any(ITEM_KEYS)?;
                let qty = p.positive_quantity(QTY_KEYS)?;
                store
                    .call(
                        actions::UPDATE_UNITS_REMOVE,
                        json!({ "seller_id": seller_id, "item_id": item_id, "qty": qty }),
                    )
                    .await
            }
            SellerAction::DisplayItemsForSale => {
                store
                    .call(
                        actions::LIST_ITEMS_FOR_SELLER,
                        json!({ "seller_id": seller_id }),
                    )
                    .await
            }
            SellerAction::CreateAccount | SellerAction::Login | SellerAction::Logout => Err(
                MarketError::Internal(format!("{:?} does not run under a session", action)).into(),
            ),
        }
    }
}

/// Listing attributes from either a nested `attrs` object or top-level
/// fields. Values are forwarded as-is; the store validates them.
fn listing_attrs(p: Params<'_>) -> Result<Map<String, Value>, GatewayError> {
    let src = if p.has("attrs") { p.object("attrs")? } else { p };

    let mut attrs = Map::new();
    for (field, keys) in LISTING_FIELDS {
        if let Some(value) = src.first_present(keys) {
            attrs.insert((*field).to_string(), value.clone());
        }
    }
    attrs.insert("keywords".into(), json!(src.keywords("keywords")?));
    Ok(attrs)
}

#[async_trait]
impl Service for SellerGateway {
    fn name(&self) -> &'static str {
        "seller-gateway"
    }

    async fn handle(&self, req: Request) -> Response {
        match self.dispatch(&req).await {
            Ok(data) => Response::ok(req.req_id, data),
            Err(e) => {
                debug!("seller action '{}' failed: {}", req.action, e);
                Response::failure(req.req_id, e.to_body())
            }
        }
    }
}
