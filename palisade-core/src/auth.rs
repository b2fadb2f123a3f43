//! Responses for requests that fail an authentication or anti-forgery check.

use crate::context::ActionContext;
use crate::http::HttpResponse;
use serde_json::json;

/// Produces the outward-facing response for a rejected request.
pub trait MissingAuthenticationHandler: Send + Sync {
    fn result(&self, ctx: &ActionContext) -> HttpResponse;
}

/// Redirect browsers to the login page.
#[derive(Debug, Clone)]
pub struct RedirectToLogin {
    login_url: String,
}

impl RedirectToLogin {
    pub fn new(login_url: impl Into<String>) -> Self {
        Self {
            login_url: login_url.into(),
        }
    }

    pub fn login_url(&self) -> &str {
        &self.login_url
    }
}

impl Default for RedirectToLogin {
    fn default() -> Self {
        Self::new("/login")
    }
}

impl MissingAuthenticationHandler for RedirectToLogin {
    fn result(&self, _ctx: &ActionContext) -> HttpResponse {
        HttpResponse::see_other(self.login_url.clone())
    }
}

/// Plain status response with a small JSON error body, for script clients.
#[derive(Debug, Clone)]
pub struct StatusRejection {
    status: u16,
    message: String,
}

impl StatusRejection {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn forbidden() -> Self {
        Self::new(403, "Forbidden")
    }
}

impl Default for StatusRejection {
    fn default() -> Self {
        Self::forbidden()
    }
}

impl MissingAuthenticationHandler for StatusRejection {
    fn result(&self, _ctx: &ActionContext) -> HttpResponse {
        let body = json!({ "status": self.status, "error": self.message });
        HttpResponse::new(self.status)
            .content_type("application/json")
            .with_body(body.to_string().into_bytes())
    }
}
