use crate::error::Result;
use crate::protector::{CsrfProtector, HmacProtector};
use palisade_core::{Crypto, HmacCrypto, MissingAuthenticationHandler, RedirectToLogin, StatusRejection};
use std::fmt;
use std::sync::Arc;

/// CSRF protection configuration
///
/// A snapshot of the global settings that route policies are resolved
/// against. Cheap to clone; collaborators are shared.
#[derive(Clone)]
pub struct CsrfConfig {
    /// Global switch, used by routes without an explicit marker
    pub enabled: bool,

    /// Form/query parameter and render argument name
    pub param_name: String,

    /// Request header carrying the token
    pub header_name: String,

    /// Cookie the token is issued in
    pub cookie_name: String,

    /// Cookie domain; `None` issues host-only cookies
    pub cookie_domain: Option<String>,

    /// Token protector
    pub protector: Arc<dyn CsrfProtector>,

    /// Crypto service sealing tokens for transport
    pub crypto: Arc<dyn Crypto>,

    /// Rejection handler for browser requests
    pub missing_authentication_handler: Arc<dyn MissingAuthenticationHandler>,

    /// Rejection handler for AJAX requests
    pub ajax_missing_authentication_handler: Arc<dyn MissingAuthenticationHandler>,
}

impl CsrfConfig {
    /// Create a configuration with default names around a crypto service
    pub fn new(crypto: Arc<dyn Crypto>) -> Self {
        Self {
            enabled: true,
            param_name: "__csrf".to_string(),
            header_name: "X-Xsrf-Token".to_string(),
            cookie_name: "XSRF-TOKEN".to_string(),
            cookie_domain: None,
            protector: Arc::new(HmacProtector),
            crypto,
            missing_authentication_handler: Arc::new(RedirectToLogin::default()),
            ajax_missing_authentication_handler: Arc::new(StatusRejection::forbidden()),
        }
    }

    /// Create a configuration keyed by an application secret (at least 32 bytes)
    pub fn with_secret(secret: impl Into<Vec<u8>>) -> Result<Self> {
        Ok(Self::new(Arc::new(HmacCrypto::new(secret)?)))
    }

    /// Configuration keyed by a random secret. Tokens do not survive a restart.
    pub fn generate() -> Self {
        Self::new(Arc::new(HmacCrypto::random()))
    }

    /// Build from the typed application configuration.
    #[cfg(feature = "config")]
    pub fn from_app_config(app: &palisade_config::AppConfig) -> Result<Self> {
        use crate::protector::RandomProtector;
        use palisade_config::{ProtectorKind, Validate};

        app.validate()?;

        let protector: Arc<dyn CsrfProtector> = match app.csrf.protector {
            ProtectorKind::Hmac => Arc::new(HmacProtector),
            ProtectorKind::Random => Arc::new(RandomProtector),
        };

        Ok(Self::with_secret(app.secret.as_bytes().to_vec())?
            .with_enabled(app.csrf.enabled)
            .with_param_name(app.csrf.param_name.clone())
            .with_header_name(app.csrf.header_name.clone())
            .with_cookie_name(app.csrf.cookie_name.clone())
            .with_cookie_domain(app.cookie_domain().map(String::from))
            .with_protector(protector)
            .with_missing_authentication_handler(Arc::new(RedirectToLogin::new(
                app.auth.login_url.clone(),
            ))))
    }

    /// Set the global switch
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set parameter name
    pub fn with_param_name(mut self, name: impl Into<String>) -> Self {
        self.param_name = name.into();
        self
    }

    /// Set header name
    pub fn with_header_name(mut self, name: impl Into<String>) -> Self {
        self.header_name = name.into();
        self
    }

    /// Set cookie name
    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    /// Set cookie domain. Blank values issue host-only cookies.
    pub fn with_cookie_domain(mut self, domain: Option<String>) -> Self {
        self.cookie_domain = domain.filter(|d| !d.trim().is_empty());
        self
    }

    pub fn with_protector(mut self, protector: Arc<dyn CsrfProtector>) -> Self {
        self.protector = protector;
        self
    }

    pub fn with_crypto(mut self, crypto: Arc<dyn Crypto>) -> Self {
        self.crypto = crypto;
        self
    }

    pub fn with_missing_authentication_handler(
        mut self,
        handler: Arc<dyn MissingAuthenticationHandler>,
    ) -> Self {
        self.missing_authentication_handler = handler;
        self
    }

    pub fn with_ajax_missing_authentication_handler(
        mut self,
        handler: Arc<dyn MissingAuthenticationHandler>,
    ) -> Self {
        self.ajax_missing_authentication_handler = handler;
        self
    }
}

impl fmt::Debug for CsrfConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CsrfConfig")
            .field("enabled", &self.enabled)
            .field("param_name", &self.param_name)
            .field("header_name", &self.header_name)
            .field("cookie_name", &self.cookie_name)
            .field("cookie_domain", &self.cookie_domain)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test_secret_key_32_bytes_long!!!";

    #[test]
    fn test_defaults() {
        let config = CsrfConfig::with_secret(SECRET.to_vec()).unwrap();
        assert!(config.enabled);
        assert_eq!(config.param_name, "__csrf");
        assert_eq!(config.header_name, "X-Xsrf-Token");
        assert_eq!(config.cookie_name, "XSRF-TOKEN");
        assert_eq!(config.cookie_domain, None);
    }

    #[test]
    fn test_short_secret() {
        assert!(CsrfConfig::with_secret(b"short".to_vec()).is_err());
    }

    #[test]
    fn test_builder() {
        let config = CsrfConfig::generate()
            .with_enabled(false)
            .with_param_name("token")
            .with_cookie_domain(Some("  ".to_string()));

        assert!(!config.enabled);
        assert_eq!(config.param_name, "token");
        assert_eq!(config.cookie_domain, None);
    }

    #[test]
    fn test_debug_hides_collaborators() {
        let debug = format!("{:?}", CsrfConfig::generate());
        assert!(debug.contains("XSRF-TOKEN"));
        assert!(!debug.contains("secret"));
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_from_app_config() {
        use palisade_config::{AppConfig, ProtectorKind};

        let mut app = AppConfig {
            secret: String::from_utf8(SECRET.to_vec()).unwrap(),
            ..AppConfig::default()
        };
        app.csrf.protector = ProtectorKind::Random;
        app.session.cookie_domain = Some("example.com".to_string());
        app.auth.login_url = "/signin".to_string();

        let config = CsrfConfig::from_app_config(&app).unwrap();
        assert_eq!(config.cookie_domain.as_deref(), Some("example.com"));
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_from_invalid_app_config() {
        let app = palisade_config::AppConfig::default();
        assert!(CsrfConfig::from_app_config(&app).is_err());
    }
}
