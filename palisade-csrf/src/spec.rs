//! Route CSRF policies.
//!
//! A [`CsrfSpec`] is resolved once per route from its markers and the
//! global configuration, then shared by every request to that route.

use crate::config::CsrfConfig;
use crate::marker::{ActionMeta, ControllerMeta, CsrfMarker};
use crate::protector::CsrfProtector;
use palisade_core::{Crypto, MissingAuthenticationHandler};
use std::fmt;
use std::sync::Arc;

/// Settings of an enabled policy.
///
/// Only enabled policies carry settings; a disabled policy has nothing to
/// consult.
#[derive(Clone)]
pub struct ActivePolicy {
    pub param_name: String,
    pub header_name: String,
    pub cookie_name: String,
    pub cookie_domain: Option<String>,
    pub protector: Arc<dyn CsrfProtector>,
    pub crypto: Arc<dyn Crypto>,
    pub missing_authentication_handler: Arc<dyn MissingAuthenticationHandler>,
    pub ajax_missing_authentication_handler: Arc<dyn MissingAuthenticationHandler>,
}

impl ActivePolicy {
    pub fn from_config(config: &CsrfConfig) -> Self {
        Self {
            param_name: config.param_name.clone(),
            header_name: config.header_name.clone(),
            cookie_name: config.cookie_name.clone(),
            cookie_domain: config.cookie_domain.clone(),
            protector: Arc::clone(&config.protector),
            crypto: Arc::clone(&config.crypto),
            missing_authentication_handler: Arc::clone(&config.missing_authentication_handler),
            ajax_missing_authentication_handler: Arc::clone(
                &config.ajax_missing_authentication_handler,
            ),
        }
    }

    /// Handler for a rejected request
    pub fn rejection_handler(&self, ajax: bool) -> &dyn MissingAuthenticationHandler {
        if ajax {
            self.ajax_missing_authentication_handler.as_ref()
        } else {
            self.missing_authentication_handler.as_ref()
        }
    }
}

impl fmt::Debug for ActivePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActivePolicy")
            .field("param_name", &self.param_name)
            .field("header_name", &self.header_name)
            .field("cookie_name", &self.cookie_name)
            .field("cookie_domain", &self.cookie_domain)
            .finish_non_exhaustive()
    }
}

/// Per-route CSRF policy.
#[derive(Debug, Clone, Default)]
pub enum CsrfSpec {
    /// Does nothing. Used for handlers outside any controller.
    #[default]
    Noop,
    /// Follows the global switch of the configuration it was resolved against.
    DeferToGlobal(Option<Arc<ActivePolicy>>),
    /// Explicit route decision; `None` means explicitly disabled.
    Concrete(Option<Arc<ActivePolicy>>),
}

impl CsrfSpec {
    pub fn noop() -> Self {
        CsrfSpec::Noop
    }

    /// Policy that follows `config.enabled`.
    pub fn global(config: &CsrfConfig) -> Self {
        CsrfSpec::DeferToGlobal(
            config
                .enabled
                .then(|| Arc::new(ActivePolicy::from_config(config))),
        )
    }

    /// Explicitly enabled policy.
    pub fn enabled(config: &CsrfConfig) -> Self {
        CsrfSpec::Concrete(Some(Arc::new(ActivePolicy::from_config(config))))
    }

    /// Explicitly disabled policy.
    pub fn disabled() -> Self {
        CsrfSpec::Concrete(None)
    }

    pub fn from_marker(marker: CsrfMarker, config: &CsrfConfig) -> Self {
        match marker {
            CsrfMarker::Disable => Self::disabled(),
            CsrfMarker::Enable => Self::enabled(config),
            CsrfMarker::Unspecified => Self::global(config),
        }
    }

    pub fn for_controller(meta: &ControllerMeta, config: &CsrfConfig) -> Self {
        Self::from_marker(meta.csrf, config)
    }

    pub fn for_action(meta: &ActionMeta, config: &CsrfConfig) -> Self {
        Self::from_marker(meta.csrf, config)
    }

    /// Whether this spec carries an explicit decision.
    pub fn is_effective(&self) -> bool {
        matches!(self, CsrfSpec::Concrete(_))
    }

    pub fn is_enabled(&self) -> bool {
        self.policy().is_some()
    }

    /// Settings to enforce, if the policy is enabled.
    pub fn policy(&self) -> Option<&ActivePolicy> {
        match self {
            CsrfSpec::Noop => None,
            CsrfSpec::DeferToGlobal(policy) | CsrfSpec::Concrete(policy) => policy.as_deref(),
        }
    }

    /// This spec if it is effective, otherwise `next`.
    pub fn chain(self, next: CsrfSpec) -> CsrfSpec {
        if self.is_effective() { self } else { next }
    }
}

impl PartialEq for CsrfSpec {
    fn eq(&self, other: &Self) -> bool {
        fn same(a: &Option<Arc<ActivePolicy>>, b: &Option<Arc<ActivePolicy>>) -> bool {
            match (a, b) {
                (Some(a), Some(b)) => Arc::ptr_eq(a, b),
                (None, None) => true,
                _ => false,
            }
        }

        match (self, other) {
            (CsrfSpec::Noop, CsrfSpec::Noop) => true,
            (CsrfSpec::DeferToGlobal(a), CsrfSpec::DeferToGlobal(b)) => same(a, b),
            (CsrfSpec::Concrete(a), CsrfSpec::Concrete(b)) => same(a, b),
            _ => false,
        }
    }
}
