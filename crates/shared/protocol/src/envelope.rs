//! Request / response envelope

use bazaar_core::{ErrorCode, MarketError};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Incoming call
///
/// `req_id` may arrive as a string, a number or null; it is always echoed back
/// as a string. `data` may be absent or null, both read as an empty object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Request {
    #[serde(default, deserialize_with = "lenient_string")]
    pub req_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub role: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub action: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub data: Map<String, Value>,
}

impl Request {
    pub fn new(req_id: impl Into<String>, action: impl Into<String>, data: Map<String, Value>) -> Self {
        Self {
            req_id: req_id.into(),
            role: String::new(),
            action: action.into(),
            data,
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    /// Lowercased, trimmed action name
    pub fn normalized_action(&self) -> String {
        self.action.trim().to_lowercase()
    }
}

/// `error` member of a failed response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
}

impl From<&MarketError> for ErrorBody {
    fn from(err: &MarketError) -> Self {
        Self {
            code: err.code(),
            message: err.to_string(),
        }
    }
}

impl From<MarketError> for ErrorBody {
    fn from(err: MarketError) -> Self {
        ErrorBody::from(&err)
    }
}

/// Outgoing reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    #[serde(default, deserialize_with = "lenient_string")]
    pub req_id: String,
    pub ok: bool,
    #[serde(default)]
    pub error: Option<ErrorBody>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub data: Map<String, Value>,
}

impl Response {
    pub fn ok(req_id: impl Into<String>, data: Map<String, Value>) -> Self {
        Self {
            req_id: req_id.into(),
            ok: true,
            error: None,
            data,
        }
    }

    pub fn failure(req_id: impl Into<String>, error: ErrorBody) -> Self {
        Self {
            req_id: req_id.into(),
            ok: false,
            error: Some(error),
            data: Map::new(),
        }
    }

    pub fn from_error(req_id: impl Into<String>, err: &MarketError) -> Self {
        Self::failure(req_id, ErrorBody::from(err))
    }

    /// Build from a handler result, echoing `req_id`
    pub fn from_result(req_id: impl Into<String>, result: Result<Map<String, Value>, MarketError>) -> Self {
        match result {
            Ok(data) => Self::ok(req_id, data),
            Err(err) => Self::from_error(req_id, &err),
        }
    }

    /// Copy of this response carrying a different `req_id`
    pub fn relabel(mut self, req_id: impl Into<String>) -> Self {
        self.req_id = req_id.into();
        self
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bazaar_core::ItemId;
    use serde_json::json;

    #[test]
    fn test_request_is_lenient() {
        let req: Request = serde_json::from_value(json!({"req_id": 17, "action": " Login "})).unwrap();
        assert_eq!(req.req_id, "17");
        assert_eq!(req.role, "");
        assert_eq!(req.normalized_action(), "login");
        assert!(req.data.is_empty());

        let req: Request =
            serde_json::from_value(json!({"req_id": null, "action": "ping", "data": null})).unwrap();
        assert_eq!(req.req_id, "");
        assert!(req.data.is_empty());
    }

    #[test]
    fn test_request_rejects_non_object_data() {
        let res: Result<Request, _> = serde_json::from_value(json!({"action": "ping", "data": [1]}));
        assert!(res.is_err());
    }

    #[test]
    fn test_failure_shape() {
        let resp = Response::from_error("9", &MarketError::NotOwner(ItemId::new(1, 2)));
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["req_id"], "9");
        assert_eq!(json["ok"], false);
        assert_eq!(json["error"]["code"], "not_owner");
        assert_eq!(json["data"], json!({}));
    }

    #[test]
    fn test_ok_shape_has_null_error() {
        let mut data = Map::new();
        data.insert("pong".into(), json!(true));
        let json = serde_json::to_value(Response::ok("1", data)).unwrap();
        assert_eq!(json["error"], Value::Null);
        assert_eq!(json["data"]["pong"], true);
    }

    #[test]
    fn test_response_round_trip() {
        let resp = Response::failure(
            "abc",
            ErrorBody {
                code: ErrorCode::InvalidSession,
                message: "invalid or expired session".into(),
            },
        );
        let bytes = crate::encode_frame(&resp).unwrap();
        let back: Response = crate::decode_payload(&bytes[crate::HEADER_LEN..]).unwrap();
        assert_eq!(back, resp);
    }
}
