//! Framed RPC surface of the store
//!
//! Maps an envelope `action` onto a [`MarketStore`] operation. Every failure
//! becomes an `ok: false` response carrying the error's code; the connection
//! is never closed from here.

use std::sync::Arc;

use async_trait::async_trait;
use bazaar_core::{CartLine, ItemDraft, MarketError, MarketResult, Role, Vote};
use bazaar_protocol::{Params, Request, Response, Service, store_actions as actions};
use log::debug;
use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::market::MarketStore;

const ITEM_KEYS: &[&str] = &["item_id", "item_key"];
const QTY_KEYS: &[&str] = &["qty", "quantity"];

pub struct StoreService {
    store: Arc<MarketStore>,
}

impl StoreService {
    pub fn new(store: Arc<MarketStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<MarketStore> {
        &self.store
    }

    fn dispatch(&self, action: &str, p: Params<'_>) -> MarketResult<Map<String, Value>> {
        let store = &self.store;
        match action {
            actions::PING => Ok(object(json!({ "pong": true }))),

            actions::CREATE_ACCOUNT => {
                let role = p.role("role")?;
                let name = p.text_any(&["username"])?;
                let id = store.create_account(role, &name, p.str("password")?)?;
                Ok(id_field(role, id))
            }
            actions::LOGIN => {
                let role = p.role("role")?;
                let username = p.text_any(&["username"])?;
                let session = store.login(role, &username, p.str("password")?)?;
                let mut data = id_field(role, session.principal_id);
                data.insert("session_token".into(), json!(session.token));
                Ok(data)
            }
            actions::LOGOUT => {
                store.logout(&p.session_token()?);
                Ok(object(json!({ "logged_out": true })))
            }
            actions::VALIDATE_SESSION => {
                let user_id = store.validate_session(p.role("role")?, &p.session_token()?)?;
                Ok(object(json!({ "user_id": user_id })))
            }

            actions::GET_SELLER_RATING | actions::GET_SELLER_RATING_BY_ID => {
                to_object(&store.seller_rating(p.id("seller_id")?)?)
            }
            actions::GET_SELLER_RATING_BY_SESSION => {
                to_object(&store.seller_rating_for_session(&p.session_token()?)?)
            }
            actions::GET_BUYER_PURCHASES => to_object(&store.buyer_purchases(&p.session_token()?)?),

            actions::CART_GET => cart_data(&store.cart(&p.session_token()?)?),
            actions::CART_ADD => {
                let lines = store.cart_add(
                    &p.session_token()?,
                    p.item_id_any(ITEM_KEYS)?,
                    p.positive_quantity(QTY_KEYS)?,
                )?;
                cart_data(&lines)
            }
            actions::CART_REMOVE => {
                let lines = store.cart_remove(
                    &p.session_token()?,
                    p.item_id_any(ITEM_KEYS)?,
                    p.positive_quantity(QTY_KEYS)?,
                )?;
                cart_data(&lines)
            }
            actions::CART_CLEAR => {
                store.cart_clear(&p.session_token()?)?;
                let mut data = cart_data(&[])?;
                data.insert("cleared".into(), json!(true));
                Ok(data)
            }
            actions::CART_SAVE => {
                let lines = store.cart_save(&p.session_token()?)?;
                let mut data = cart_data(&lines)?;
                data.insert("saved".into(), json!(true));
                Ok(data)
            }

            actions::REGISTER_ITEM => {
                let seller_id = p.id("seller_id")?;
                let item = store.register_item(seller_id, item_draft(p.object("attrs")?)?)?;
                Ok(object(json!({ "item_id": item.item_id })))
            }
            actions::CHANGE_ITEM_PRICE => {
                store.change_item_price(
                    p.id("seller_id")?,
                    &p.item_id_any(ITEM_KEYS)?,
                    p.decimal("new_price")?,
                )?;
                Ok(object(json!({ "updated": true })))
            }
            actions::UPDATE_UNITS_REMOVE => {
                let left = store.remove_units(
                    p.id("seller_id")?,
                    &p.item_id_any(ITEM_KEYS)?,
                    p.positive_quantity(QTY_KEYS)?,
                )?;
                Ok(object(json!({ "updated": true, "item_quantity": left })))
            }
            actions::LIST_ITEMS_FOR_SELLER => {
                let items = store.items_for_seller(p.id("seller_id")?);
                Ok(object(json!({ "items": to_value(&items)? })))
            }
            actions::GET_ITEM => {
                let item = store.item(&p.item_id_any(ITEM_KEYS)?)?;
                Ok(object(json!({ "item": to_value(&item)? })))
            }
            actions::PROVIDE_FEEDBACK => {
                let vote: Vote = p.str("vote")?.parse()?;
                let feedback = store.provide_feedback(&p.item_id_any(ITEM_KEYS)?, vote)?;
                Ok(object(json!({ "item_feedback": to_value(&feedback)? })))
            }
            actions::SEARCH => {
                let items = store.search(p.int("category")?, &p.keywords("keywords")?)?;
                Ok(object(json!({ "items": to_value(&items)? })))
            }
            actions::MAKE_PURCHASE => {
                let txn = store.make_purchase(&p.session_token()?)?;
                Ok(object(json!({ "transaction": to_value(&txn)? })))
            }
            actions::SWEEP_SESSIONS => {
                let removed = store.sweep_expired_sessions();
                Ok(object(json!({ "removed": removed })))
            }

            other => Err(MarketError::UnknownAction(other.to_string())),
        }
    }
}

#[async_trait]
impl Service for StoreService {
    fn name(&self) -> &'static str {
        "store"
    }

    async fn handle(&self, req: Request) -> Response {
        let action = req.normalized_action();
        let result = self.dispatch(&action, Params::new(&req.data));
        if let Err(e) = &result {
            debug!("store action '{}' rejected: {}", action, e);
        }
        Response::from_result(req.req_id, result)
    }
}

fn item_draft(attrs: Params<'_>) -> MarketResult<ItemDraft> {
    Ok(ItemDraft {
        name: attrs.text_any(&["item_name"])?,
        category: attrs.int("item_category")?,
        keywords: attrs.keywords("keywords")?,
        condition: attrs.str("condition")?.to_string(),
        price: attrs.decimal("sale_price")?,
        quantity: attrs.int("item_quantity")?,
    })
}

fn id_field(role: Role, id: u64) -> Map<String, Value> {
    let mut data = Map::new();
    data.insert(role.id_field().to_string(), json!(id));
    data
}

fn cart_data(lines: &[CartLine]) -> MarketResult<Map<String, Value>> {
    Ok(object(json!({ "cart": to_value(&lines)? })))
}

fn to_value<T: Serialize + ?Sized>(value: &T) -> MarketResult<Value> {
    serde_json::to_value(value).map_err(|e| MarketError::Internal(e.to_string()))
}

fn to_object<T: Serialize>(value: &T) -> MarketResult<Map<String, Value>> {
    Ok(object(to_value(value)?))
}

/// Unwrap a JSON object; anything else is wrapped under `value`
fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert("value".into(), other);
            map
        }
    }
}
