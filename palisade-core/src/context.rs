//! Per-request action context.
//!
//! An [`ActionContext`] lives exactly as long as one request. It carries the
//! request, the response being built, the session once it has been resolved,
//! the render arguments handed to templates, and a few request-scoped
//! attributes that pipeline stages use to talk to each other.

use crate::http::{HttpRequest, HttpResponse};
use crate::session::Session;
use std::collections::HashMap;

/// Request-scoped attributes shared between pipeline stages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestAttributes {
    /// CSRF token located during this request, cached so later stages do not
    /// parse headers and parameters again.
    pub csrf_token_prefetch: Option<String>,
    /// Set when the session was anonymous at resolution time.
    pub was_unauthenticated: bool,
}

impl RequestAttributes {
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Everything a handler needs to serve one request.
#[derive(Debug)]
pub struct ActionContext {
    request: HttpRequest,
    response: HttpResponse,
    session: Option<Session>,
    render_args: HashMap<String, String>,
    attributes: RequestAttributes,
}

impl ActionContext {
    pub fn new(request: HttpRequest) -> Self {
        Self {
            request,
            response: HttpResponse::ok(),
            session: None,
            render_args: HashMap::new(),
            attributes: RequestAttributes::default(),
        }
    }

    pub fn req(&self) -> &HttpRequest {
        &self.request
    }

    pub fn resp(&self) -> &HttpResponse {
        &self.response
    }

    pub fn resp_mut(&mut self) -> &mut HttpResponse {
        &mut self.response
    }

    /// Finish the request, yielding the response built so far.
    pub fn into_response(self) -> HttpResponse {
        self.response
    }

    pub fn is_ajax(&self) -> bool {
        self.request.is_ajax()
    }

    /// Request parameter from path, query string or body.
    pub fn param_value(&self, name: &str) -> Option<String> {
        self.request.param_value(name)
    }

    // ========== Session ==========

    /// Install the resolved session and record whether it was anonymous.
    pub fn attach_session(&mut self, session: Session) {
        self.attributes.was_unauthenticated = !session.is_authenticated();
        self.session = Some(session);
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// The session, starting an anonymous one if none was resolved.
    pub fn session_mut(&mut self) -> &mut Session {
        self.session.get_or_insert_with(Session::generate)
    }

    pub fn take_session(&mut self) -> Option<Session> {
        self.session.take()
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.as_ref().is_some_and(Session::is_authenticated)
    }

    // ========== Render arguments ==========

    pub fn render_arg(&self, name: &str) -> Option<&str> {
        self.render_args.get(name).map(String::as_str)
    }

    pub fn set_render_arg(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.render_args.insert(name.into(), value.into());
    }

    pub fn render_args(&self) -> &HashMap<String, String> {
        &self.render_args
    }

    // ========== Attributes ==========

    pub fn attributes(&self) -> &RequestAttributes {
        &self.attributes
    }

    pub fn prefetched_csrf_token(&self) -> Option<&str> {
        self.attributes.csrf_token_prefetch.as_deref()
    }

    pub fn set_prefetched_csrf_token(&mut self, token: impl Into<String>) {
        self.attributes.csrf_token_prefetch = Some(token.into());
    }

    pub fn clear_prefetched_csrf_token(&mut self) {
        self.attributes.csrf_token_prefetch = None;
    }

    pub fn was_unauthenticated(&self) -> bool {
        self.attributes.was_unauthenticated
    }

    pub fn set_was_unauthenticated(&mut self, value: bool) {
        self.attributes.was_unauthenticated = value;
    }

    pub fn clear_attributes(&mut self) {
        self.attributes.clear();
    }
}
