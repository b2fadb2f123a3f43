//! Typed application configuration.
//!
//! ```toml
//! secret = "at-least-thirty-two-bytes-of-secret"
//!
//! [csrf]
//! enabled = true
//! param_name = "__csrf"
//! header_name = "X-Xsrf-Token"
//! cookie_name = "XSRF-TOKEN"
//! protector = "hmac"
//!
//! [session]
//! cookie_domain = "example.com"
//!
//! [auth]
//! login_url = "/login"
//! ```

use crate::validation::{ConfigValidator, Validate};
use crate::Result;
use serde::{Deserialize, Serialize};

/// Minimum length of the application secret.
pub const MIN_SECRET_LEN: usize = 32;

/// Which token protector issues and verifies CSRF tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtectorKind {
    /// Stateless token derived from the session and signed
    #[default]
    Hmac,
    /// Random token stored in the session
    Random,
}

/// CSRF settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsrfOptions {
    /// Global switch; per-route markers may override it
    pub enabled: bool,
    /// Form/query parameter and render argument carrying the token
    pub param_name: String,
    /// Request header carrying the token
    pub header_name: String,
    /// Cookie the token is issued in
    pub cookie_name: String,
    /// Token protector
    pub protector: ProtectorKind,
}

impl Default for CsrfOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            param_name: "__csrf".to_string(),
            header_name: "X-Xsrf-Token".to_string(),
            cookie_name: "XSRF-TOKEN".to_string(),
            protector: ProtectorKind::Hmac,
        }
    }
}

/// Session cookie settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionOptions {
    /// Domain attribute applied to cookies; unset means host-only
    pub cookie_domain: Option<String>,
}

/// Authentication settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthOptions {
    /// Where browsers are sent when a request is rejected
    pub login_url: String,
}

impl Default for AuthOptions {
    fn default() -> Self {
        Self {
            login_url: "/login".to_string(),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Key for signing and sealing values sent to clients
    pub secret: String,
    pub csrf: CsrfOptions,
    pub session: SessionOptions,
    pub auth: AuthOptions,
}

impl AppConfig {
    /// Cookie domain, with blank values treated as unset.
    pub fn cookie_domain(&self) -> Option<&str> {
        self.session
            .cookie_domain
            .as_deref()
            .filter(|d| !d.trim().is_empty())
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        ConfigValidator::min_len(&self.secret, MIN_SECRET_LEN, "secret")?;
        ConfigValidator::not_empty(&self.csrf.param_name, "csrf.param_name")?;
        ConfigValidator::is_token(&self.csrf.header_name, "csrf.header_name")?;
        ConfigValidator::is_token(&self.csrf.cookie_name, "csrf.cookie_name")?;
        ConfigValidator::is_path(&self.auth.login_url, "auth.login_url")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> AppConfig {
        AppConfig {
            secret: "0123456789abcdef0123456789abcdef".to_string(),
            ..AppConfig::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert!(config.csrf.enabled);
        assert_eq!(config.csrf.param_name, "__csrf");
        assert_eq!(config.csrf.header_name, "X-Xsrf-Token");
        assert_eq!(config.csrf.cookie_name, "XSRF-TOKEN");
        assert_eq!(config.csrf.protector, ProtectorKind::Hmac);
        assert_eq!(config.cookie_domain(), None);
    }

    #[test]
    fn test_validation() {
        assert!(valid().validate().is_ok());
        assert!(AppConfig::default().validate().is_err());

        let mut config = valid();
        config.csrf.header_name = "X Token".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_deserialize() {
        let config: AppConfig =
            serde_json::from_str(r#"{"csrf": {"protector": "random"}}"#).unwrap();
        assert_eq!(config.csrf.protector, ProtectorKind::Random);
        assert!(config.csrf.enabled);
    }

    #[test]
    fn test_blank_cookie_domain() {
        let mut config = valid();
        config.session.cookie_domain = Some(" ".to_string());
        assert_eq!(config.cookie_domain(), None);
    }
}
