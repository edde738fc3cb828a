//! Typed client for the store's framed RPC surface
//!
//! Every call gets a fresh internal `req_id` (`gw-<n>`); the front doors
//! answer their own clients with the client's `req_id`, never this one.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use bazaar_core::{AccountId, ErrorCode, MarketError, Role, SessionToken};
use bazaar_protocol::{ErrorBody, Params, Request, store_actions as actions};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};

use crate::error::GatewayError;
use crate::transport::Requester;

pub struct StoreClient {
    requester: Arc<dyn Requester>,
    next_req: AtomicU64,
}

impl StoreClient {
    pub fn new(requester: Arc<dyn Requester>) -> Self {
        Self {
            requester,
            next_req: AtomicU64::new(1),
        }
    }

    /// One round trip. `ok: false` becomes [`GatewayError::Rejected`].
    pub async fn call(&self, action: &str, data: Value) -> Result<Map<String, Value>, GatewayError> {
        let req_id = format!("gw-{}", self.next_req.fetch_add(1, Ordering::Relaxed));
        let req = Request::new(req_id, action, object(data));

        let resp = match self.requester.call(req).await {
            Ok(resp) => resp,
            Err(e) => {
                warn!("Store call '{}' failed: {}", action, e);
                return Err(e.into());
            }
        };

        if resp.ok {
            return Ok(resp.data);
        }
        let body = resp.error.unwrap_or_else(|| ErrorBody {
            code: ErrorCode::InternalError,
            message: format!("store rejected '{}' without an error body", action),
        });
        debug!("Store rejected '{}': {:?}", action, body.code);
        Err(GatewayError::Rejected(body))
    }

    /// Resolve a token to its principal, failing unless it is a live session
    /// of `role`
    pub async fn validate_session(
        &self,
        role: Role,
        token: &SessionToken,
    ) -> Result<AccountId, GatewayError> {
        let data = self
            .call(
                actions::VALIDATE_SESSION,
                json!({ "role": role, "session_token": token }),
            )
            .await?;
        Params::new(&data).id("user_id").map_err(bad_response)
    }

    pub async fn create_account(
        &self,
        role: Role,
        username: &str,
        password: &str,
    ) -> Result<Map<String, Value>, GatewayError> {
        self.call(
            actions::CREATE_ACCOUNT,
            json!({ "role": role, "username": username, "password": password }),
        )
        .await
    }

    pub async fn login(
        &self,
        role: Role,
        username: &str,
        password: &str,
    ) -> Result<Map<String, Value>, GatewayError> {
        self.call(
            actions::LOGIN,
            json!({ "role": role, "username": username, "password": password }),
        )
        .await
    }

    pub async fn logout(&self, token: &SessionToken) -> Result<Map<String, Value>, GatewayError> {
        self.call(actions::LOGOUT, json!({ "session_token": token }))
            .await
    }
}

/// Deserialize `data[key]` from a store response
pub fn decode<T: DeserializeOwned>(data: &Map<String, Value>, key: &str) -> Result<T, GatewayError> {
    let value = data
        .get(key)
        .cloned()
        .ok_or_else(|| bad_response(format!("missing '{}'", key)))?;
    serde_json::from_value(value).map_err(|e| bad_response(format!("'{}': {}", key, e)))
}

fn bad_response(detail: impl std::fmt::Display) -> GatewayError {
    MarketError::Internal(format!("unexpected store response: {}", detail)).into()
}

pub(crate) fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
