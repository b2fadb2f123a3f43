//! # Palisade Core
//!
//! Shared building blocks for the Palisade crates: HTTP request/response
//! types, cookies, the per-visit [`Session`], the per-request
//! [`ActionContext`], the application [`Crypto`] service and the handlers
//! that turn a failed security check into a response.
//!
//! ```rust
//! use palisade_core::{ActionContext, HttpMethod, HttpRequest, Session};
//!
//! let req = HttpRequest::new(HttpMethod::POST, "/orders?draft=1")
//!     .with_header("X-Requested-With", "XMLHttpRequest");
//! let mut ctx = ActionContext::new(req);
//! ctx.attach_session(Session::new("visit-1"));
//!
//! assert!(ctx.is_ajax());
//! assert!(ctx.was_unauthenticated());
//! assert_eq!(ctx.param_value("draft").as_deref(), Some("1"));
//! ```

pub mod auth;
pub mod context;
pub mod cookie;
pub mod crypto;
pub mod error;
pub mod http;
pub mod session;

pub use auth::{MissingAuthenticationHandler, RedirectToLogin, StatusRejection};
pub use context::{ActionContext, RequestAttributes};
pub use cookie::{Cookie, SameSite};
pub use crypto::{Crypto, HmacCrypto, random_token};
pub use error::{Error, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use session::{Session, USERNAME_KEY, generate_session_id};
