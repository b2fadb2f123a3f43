// Palisade - session-bound CSRF protection and static file serving
//
// This library bundles the Palisade crates: a per-route CSRF gate with
// pluggable token protectors, a static file getter, and the configuration
// and logging layers around them.

// Re-export core functionality
pub use palisade_core::*;

// Re-export member crates
pub use palisade_csrf as csrf;
pub use palisade_log as log;

#[cfg(feature = "config")]
pub use palisade_config as config;

#[cfg(feature = "files")]
pub use palisade_files as files;

/// Build a CSRF gate from configuration loaded by `manager`.
///
/// Routes are registered through `routes`, which receives a registry
/// builder already bound to the resulting configuration.
#[cfg(feature = "config")]
pub fn gate_from_config<F>(
    manager: &palisade_config::ConfigManager,
    routes: F,
) -> palisade_csrf::Result<palisade_csrf::CsrfGate>
where
    F: FnOnce(palisade_csrf::SpecRegistryBuilder) -> palisade_csrf::SpecRegistryBuilder,
{
    let app = manager.app_config()?;
    let config = palisade_csrf::CsrfConfig::from_app_config(&app)?;
    let registry = routes(palisade_csrf::SpecRegistry::builder(config)).build();
    Ok(palisade_csrf::CsrfGate::new(registry))
}

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        ActionContext, Cookie, Crypto, Error, HmacCrypto, HttpMethod, HttpRequest, HttpResponse,
        MissingAuthenticationHandler, RedirectToLogin, Session, StatusRejection,
    };

    pub use palisade_csrf::{
        CsrfConfig, CsrfError, CsrfGate, CsrfMarker, CsrfProtector, CsrfSpec, HeaderMirror,
        HmacProtector, RandomProtector, SpecRegistry, form_field,
    };

    #[cfg(feature = "config")]
    pub use palisade_config::{AppConfig, ConfigManager};

    #[cfg(feature = "files")]
    pub use palisade_files::StaticFileGetter;
}
