use std::collections::HashMap;

use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

const USERNAME: &str = "username";
const FULL_NAME: &str = "full_name";

/// JWT claims structure.
///
/// Standard registered claims plus custom fields via the flattened `extra` map.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Claims {
    /// Subject (user identifier)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Expiration time (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    /// Issued at (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Additional custom fields (flattened into token)
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Claims {
    /// Create new empty claims.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create access-token claims for a user.
    ///
    /// # Arguments
    /// * `user_id` - Unique user identifier
    /// * `username` - Username (stored in `extra.username`)
    /// * `full_name` - Display name (stored in `extra.full_name`)
    /// * `ttl` - Time until the token expires
    ///
    /// # Returns
    /// Claims with sub, exp, iat, username and full_name set
    pub fn for_user(
        user_id: impl ToString,
        username: impl Into<String>,
        full_name: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        let username: String = username.into();
        let full_name: String = full_name.into();
        let now = Utc::now();
        let expiration = now + ttl;

        Self::new()
            .with_subject(user_id)
            .with_issued_at(now.timestamp())
            .with_expiration(expiration.timestamp())
            .with_extra(USERNAME, username)
            .with_extra(FULL_NAME, full_name)
    }

    /// Set subject.
    pub fn with_subject(mut self, sub: impl ToString) -> Self {
        self.sub = Some(sub.to_string());
        self
    }

    /// Set expiration (Unix timestamp).
    pub fn with_expiration(mut self, exp: i64) -> Self {
        self.exp = Some(exp);
        self
    }

    /// Set issued at (Unix timestamp).
    pub fn with_issued_at(mut self, iat: i64) -> Self {
        self.iat = Some(iat);
        self
    }

    /// Add a custom field.
    pub fn with_extra(mut self, key: impl ToString, value: impl Serialize) -> Self {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.extra.insert(key.to_string(), json_value);
        }
        self
    }

    pub fn username(&self) -> Option<String> {
        self.extra_str(USERNAME)
    }

    pub fn full_name(&self) -> Option<String> {
        self.extra_str(FULL_NAME)
    }

    fn extra_str(&self, key: &str) -> Option<String> {
        self.extra
            .get(key)
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    }
}
