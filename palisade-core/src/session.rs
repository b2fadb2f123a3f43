//! Per-visit session state.
//!
//! Only the in-memory shape lives here; persisting a session between
//! requests is the job of whatever store the host application uses.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Session key under which the authenticated username is kept.
pub const USERNAME_KEY: &str = "username";

/// Session data structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier
    pub id: String,
    /// Session data as key-value pairs
    pub data: HashMap<String, serde_json::Value>,
    /// Session creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last access timestamp
    pub last_accessed_at: DateTime<Utc>,
}

impl Session {
    /// Create an empty session with the given ID.
    pub fn new(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            data: HashMap::new(),
            created_at: now,
            last_accessed_at: now,
        }
    }

    /// Create an empty session with a fresh random ID.
    pub fn generate() -> Self {
        Self::new(generate_session_id())
    }

    /// Get a value from the session data.
    pub fn get<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        self.data.get(key).and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Get a string value from the session data.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(|v| v.as_str())
    }

    /// Set a value in the session data.
    pub fn set<T: Serialize>(&mut self, key: &str, value: T) -> Result<()> {
        let json_value =
            serde_json::to_value(value).map_err(|e| Error::Serialization(e.to_string()))?;
        self.data.insert(key.to_string(), json_value);
        Ok(())
    }

    /// Remove a value from the session data.
    pub fn remove(&mut self, key: &str) -> Option<serde_json::Value> {
        self.data.remove(key)
    }

    /// Check if a key exists in the session data.
    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Username of the authenticated user, if any.
    pub fn username(&self) -> Option<&str> {
        self.get_str(USERNAME_KEY).filter(|u| !u.trim().is_empty())
    }

    /// Record a successful login.
    pub fn login(&mut self, username: impl Into<String>) {
        self.data
            .insert(USERNAME_KEY.to_string(), serde_json::Value::String(username.into()));
        debug!(session = %self.id, "Session authenticated");
    }

    /// Forget the authenticated user.
    pub fn logout(&mut self) {
        if self.data.remove(USERNAME_KEY).is_some() {
            debug!(session = %self.id, "Session logged out");
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.username().is_some()
    }
}

/// Generate a new unique session ID.
pub fn generate_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let mut session = Session::new("s1");
        session.set("count", 3).unwrap();
        assert_eq!(session.get::<i32>("count"), Some(3));
        assert!(session.contains("count"));
        assert!(session.remove("count").is_some());
        assert!(!session.contains("count"));
    }

    #[test]
    fn test_login_logout() {
        let mut session = Session::generate();
        assert!(!session.is_authenticated());

        session.login("alice");
        assert_eq!(session.username(), Some("alice"));

        session.logout();
        assert_eq!(session.username(), None);
    }

    #[test]
    fn test_blank_username_is_anonymous() {
        let mut session = Session::new("s1");
        session.login("  ");
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(generate_session_id(), generate_session_id());
    }
}
