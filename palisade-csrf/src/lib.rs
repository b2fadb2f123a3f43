//! # Palisade CSRF Protection
//!
//! Session-bound Cross-Site Request Forgery protection with per-route
//! policies.
//!
//! ## Features
//!
//! - **Per-route policies** - controllers and actions can force protection
//!   on or off; everything else follows the global switch
//! - **Early rejection** - unsafe requests without a token are turned away
//!   before the session is loaded
//! - **Session-bound tokens** - verification is delegated to a pluggable
//!   [`CsrfProtector`]
//! - **Rotate on login** - a fresh token is issued when a user logs in
//! - **Template support** - the token is exposed as a render argument and
//!   through [`form_field`]
//!
//! ## Quick Start
//!
//! ```rust
//! use palisade_csrf::{CsrfConfig, CsrfGate, CsrfMarker, SpecRegistry};
//! use palisade_core::{ActionContext, HttpMethod, HttpRequest, HttpResponse, Session};
//!
//! let config = CsrfConfig::generate();
//! let registry = SpecRegistry::builder(config)
//!     .controller("Webhooks", CsrfMarker::Disable)
//!     .build();
//! let gate = CsrfGate::new(registry);
//!
//! // A form page: the response carries a fresh token.
//! let mut ctx = ActionContext::new(HttpRequest::new(HttpMethod::GET, "/orders/new"));
//! let response = gate.run_route(
//!     "Orders",
//!     "new",
//!     &mut ctx,
//!     |_| Session::new("visit-1"),
//!     |_| HttpResponse::html("<form></form>"),
//! );
//! assert_eq!(response.status, 200);
//! let token = response.cookie("XSRF-TOKEN").unwrap().value.clone();
//!
//! // Submitting without the token is rejected.
//! let mut ctx = ActionContext::new(HttpRequest::new(HttpMethod::POST, "/orders"));
//! let response = gate.run_route(
//!     "Orders",
//!     "create",
//!     &mut ctx,
//!     |_| Session::new("visit-1"),
//!     |_| HttpResponse::ok(),
//! );
//! assert_eq!(response.status, 303);
//!
//! // Submitting with it succeeds.
//! let req = HttpRequest::new(HttpMethod::POST, "/orders").with_header("X-Xsrf-Token", token);
//! let mut ctx = ActionContext::new(req);
//! let response = gate.run_route(
//!     "Orders",
//!     "create",
//!     &mut ctx,
//!     |_| Session::new("visit-1"),
//!     |_| HttpResponse::ok().with_status(201),
//! );
//! assert_eq!(response.status, 201);
//! ```

pub mod config;
pub mod error;
pub mod gate;
pub mod marker;
pub mod protector;
pub mod registry;
pub mod spec;
pub mod token;

pub use config::CsrfConfig;
pub use error::{CsrfError, Result};
pub use gate::CsrfGate;
pub use marker::{ActionMeta, ControllerMeta, CsrfMarker, RouteKey};
pub use protector::{CsrfProtector, HeaderMirror, HmacProtector, RandomProtector};
pub use registry::{SpecRegistry, SpecRegistryBuilder};
pub use spec::{ActivePolicy, CsrfSpec};
pub use token::{form_field, token};
