use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

use crate::values::{AccountId, Role, Timestamp};

/// Opaque session token
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Generate a fresh random token
    pub fn generate() -> Self {
        SessionToken(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionToken {
    fn from(s: &str) -> Self {
        SessionToken(s.to_string())
    }
}

impl From<String> for SessionToken {
    fn from(s: String) -> Self {
        SessionToken(s)
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A logged-in principal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: SessionToken,
    pub role: Role,
    pub principal_id: AccountId,
    pub created_at: Timestamp,
    pub last_activity: Timestamp,
}

impl Session {
    pub fn new(token: SessionToken, role: Role, principal_id: AccountId, now: Timestamp) -> Self {
        Self {
            token,
            role,
            principal_id,
            created_at: now,
            last_activity: now,
        }
    }

    /// True once `now - last_activity >= timeout`
    pub fn is_expired(&self, now: Timestamp, timeout: Duration) -> bool {
        // A clock that stepped backwards counts as no idle time
        let idle = (now - self.last_activity).to_std().unwrap_or(Duration::ZERO);
        idle >= timeout
    }

    /// Refresh `last_activity`; never moves it past `now` or backwards
    pub fn touch(&mut self, now: Timestamp) {
        if now > self.last_activity {
            self.last_activity = now;
        }
    }
}
