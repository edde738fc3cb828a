//! Typed access to a request's `data` object
//!
//! Every extraction failure is a [`MarketError::Validation`], so handlers can
//! `?` their way through argument parsing and still answer with a structured
//! `validation_error` response.

use std::str::FromStr;

use bazaar_core::{ItemId, MarketError, MarketResult, Quantity, Role, SessionToken};
use rust_decimal::Decimal;
use serde_json::{Map, Value};

/// Borrowed view over request parameters
#[derive(Debug, Clone, Copy)]
pub struct Params<'a> {
    data: &'a Map<String, Value>,
}

impl<'a> Params<'a> {
    pub fn new(data: &'a Map<String, Value>) -> Self {
        Self { data }
    }

    /// Value under `key`; null counts as absent
    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.data.get(key).filter(|v| !v.is_null())
    }

    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// First key in `keys` that carries a value
    pub fn first_present(&self, keys: &[&str]) -> Option<&'a Value> {
        keys.iter().find_map(|key| self.get(key))
    }

    fn require(&self, key: &str) -> MarketResult<&'a Value> {
        self.get(key)
            .ok_or_else(|| MarketError::Validation(format!("missing field: {}", key)))
    }

    fn require_any(&self, keys: &[&str]) -> MarketResult<&'a Value> {
        self.first_present(keys)
            .ok_or_else(|| MarketError::Validation(format!("missing field: {}", keys.join("/"))))
    }

    /// Required string field
    pub fn str(&self, key: &str) -> MarketResult<&'a str> {
        self.require(key)?
            .as_str()
            .ok_or_else(|| MarketError::Validation(format!("{} must be a string", key)))
    }

    /// Required field rendered as text; numbers are accepted as well as strings
    pub fn text_any(&self, keys: &[&str]) -> MarketResult<String> {
        match self.require_any(keys)? {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            _ => Err(MarketError::Validation(format!(
                "{} must be a string",
                keys.join("/")
            ))),
        }
    }

    /// Required integer; numeric strings are coerced
    pub fn int(&self, key: &str) -> MarketResult<i64> {
        as_int(self.require(key)?, key)
    }

    pub fn int_any(&self, keys: &[&str]) -> MarketResult<i64> {
        as_int(self.require_any(keys)?, &keys.join("/"))
    }

    /// Required non-negative id
    pub fn id(&self, key: &str) -> MarketResult<u64> {
        let value = self.int(key)?;
        u64::try_from(value).map_err(|_| MarketError::Validation(format!("{} must be >= 0", key)))
    }

    /// Required strictly positive quantity under any of `keys`
    pub fn positive_quantity(&self, keys: &[&str]) -> MarketResult<Quantity> {
        let value = self.int_any(keys)?;
        if value <= 0 {
            return Err(MarketError::validation("quantity must be positive"));
        }
        Quantity::try_from(value).map_err(|_| MarketError::validation("quantity is too large"))
    }

    /// Required decimal; accepts JSON numbers and numeric strings
    pub fn decimal(&self, key: &str) -> MarketResult<Decimal> {
        let invalid = || MarketError::Validation(format!("{} must be a number", key));
        let text = match self.require(key)? {
            Value::Number(n) => n.to_string(),
            Value::String(s) => s.trim().to_string(),
            _ => return Err(invalid()),
        };
        Decimal::from_str(&text)
            .or_else(|_| Decimal::from_scientific(&text))
            .map_err(|_| invalid())
    }

    /// Required item id in object, `"c:n"` or pair form
    pub fn item_id(&self, key: &str) -> MarketResult<ItemId> {
        serde_json::from_value(self.require(key)?.clone())
            .map_err(|_| MarketError::Validation(format!("invalid {}", key)))
    }

    /// Item id under the first present key in `keys`
    pub fn item_id_any(&self, keys: &[&str]) -> MarketResult<ItemId> {
        serde_json::from_value(self.require_any(keys)?.clone())
            .map_err(|_| MarketError::Validation(format!("invalid {}", keys.join("/"))))
    }

    pub fn role(&self, key: &str) -> MarketResult<Role> {
        self.str(key)?.parse()
    }

    /// Required session token, as a string or number
    pub fn session_token(&self) -> MarketResult<SessionToken> {
        self.text_any(&["session_token"]).map(SessionToken::from)
    }

    /// Optional keyword list: a JSON array of strings or a comma-separated
    /// string. Absent or null yields an empty list; blanks are dropped.
    pub fn keywords(&self, key: &str) -> MarketResult<Vec<String>> {
        match self.get(key) {
            None => Ok(Vec::new()),
            Some(Value::String(s)) => Ok(s
                .split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(str::to_string)
                .collect()),
            Some(Value::Array(values)) => values
                .iter()
                .map(|v| match v {
                    Value::String(s) => Ok(s.trim().to_string()),
                    Value::Number(n) => Ok(n.to_string()),
                    _ => Err(MarketError::Validation(format!(
                        "{} must be a list of strings",
                        key
                    ))),
                })
                .filter(|kw| !matches!(kw, Ok(s) if s.is_empty()))
                .collect(),
            Some(_) => Err(MarketError::Validation(format!(
                "{} must be a list of strings",
                key
            ))),
        }
    }

    /// Required object field
    pub fn object(&self, key: &str) -> MarketResult<Params<'a>> {
        match self.require(key)? {
            Value::Object(map) => Ok(Params::new(map)),
            _ => Err(MarketError::Validation(format!("{} must be an object", key))),
        }
    }

    /// Underlying map
    pub fn as_map(&self) -> &'a Map<String, Value> {
        self.data
    }
}

fn as_int(value: &Value, field: &str) -> MarketResult<i64> {
    let invalid = || MarketError::Validation(format!("{} must be an integer", field));
    match value {
        Value::Number(n) => n.as_i64().ok_or_else(invalid),
        Value::String(s) => s.trim().parse().map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}
