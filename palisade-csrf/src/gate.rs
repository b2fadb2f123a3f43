//! Request gate.
//!
//! Enforcement happens in three phases around a handler:
//!
//! 1. [`CsrfSpec::pre_check`] runs before the session is loaded and rejects
//!    unsafe requests that carry no token at all.
//! 2. [`CsrfSpec::check`] verifies the token against the loaded session.
//! 3. [`CsrfSpec::set_cookie_and_render_args`] makes sure the response
//!    carries a usable token, rotating it when missing or after a login.
//!
//! [`CsrfGate`] wires the phases around a handler.

use crate::error::{CsrfError, Result};
use crate::registry::SpecRegistry;
use crate::spec::{ActivePolicy, CsrfSpec};
use palisade_core::{ActionContext, Cookie, HttpRequest, HttpResponse, Session};
use std::sync::Arc;
use tracing::{debug, error, warn};

impl ActivePolicy {
    fn reject(&self, ctx: &mut ActionContext) -> CsrfError {
        ctx.clear_prefetched_csrf_token();
        let response = self.rejection_handler(ctx.is_ajax()).result(ctx);
        CsrfError::NotVerified(Box::new(response))
    }

    fn rotate(&self, ctx: &mut ActionContext) -> Result<String> {
        let crypto = self.crypto.as_ref();
        let session = ctx.session_mut();
        self.protector
            .clear_existing_token(session, &self.cookie_name)?;
        let raw = self
            .protector
            .generate_token(session, &self.cookie_name, crypto)?;
        let token = crypto.encrypt(&raw)?;

        ctx.resp_mut().set_cookie(
            Cookie::new(self.cookie_name.as_str(), token.as_str())
                .with_domain(self.cookie_domain.as_deref())
                .with_path("/"),
        );
        self.protector.output_token(
            &token,
            &self.cookie_name,
            self.cookie_domain.as_deref(),
            ctx,
        );

        ctx.set_prefetched_csrf_token(token.clone());
        Ok(token)
    }
}

impl CsrfSpec {
    /// Reject unsafe requests without a token, before any session work.
    pub fn pre_check(&self, ctx: &mut ActionContext) -> Result<()> {
        let Some(policy) = self.policy() else {
            return Ok(());
        };
        if ctx.req().method.is_safe() {
            return Ok(());
        }

        if policy.resolve_token(ctx).is_none() {
            debug!(
                method = %ctx.req().method,
                path = %ctx.req().path,
                "CSRF token missing"
            );
            return Err(policy.reject(ctx));
        }
        Ok(())
    }

    /// Verify the request token against the session attached to `ctx`.
    ///
    /// Protector failures count as a failed verification.
    pub fn check(&self, ctx: &mut ActionContext) -> Result<()> {
        let Some(policy) = self.policy() else {
            return Ok(());
        };
        if ctx.req().method.is_safe() {
            return Ok(());
        }

        let verified = match (policy.resolve_token(ctx), ctx.session()) {
            (Some(token), Some(session)) => {
                match policy
                    .protector
                    .verify_token(&token, session, &policy.cookie_name, policy.crypto.as_ref())
                {
                    Ok(verified) => verified,
                    Err(e) => {
                        warn!(error = %e, session = %session.id, "CSRF token could not be verified");
                        false
                    }
                }
            }
            _ => false,
        };

        if !verified {
            debug!(
                method = %ctx.req().method,
                path = %ctx.req().path,
                "CSRF token rejected"
            );
            return Err(policy.reject(ctx));
        }
        Ok(())
    }

    /// Issue a token for the response and expose it to templates.
    ///
    /// A new token is generated when the request has none and the session
    /// holds none, or when the user has just logged in. Calling this again
    /// in the same request changes nothing.
    pub fn set_cookie_and_render_args(&self, ctx: &mut ActionContext) -> Result<()> {
        let Some(policy) = self.policy() else {
            return Ok(());
        };

        let mut token = policy.resolve_token(ctx);
        if token.is_none() {
            let session = ctx.session_mut();
            token = policy
                .protector
                .retrieve_token(session, &policy.cookie_name, policy.crypto.as_ref())?
                .filter(|t| !t.trim().is_empty());
        }

        let just_logged_in = ctx.was_unauthenticated() && ctx.is_logged_in();
        let token = match token {
            Some(token) if !just_logged_in => token,
            _ => {
                debug!(just_logged_in, "Issuing new CSRF token");
                let token = policy.rotate(ctx)?;
                // Only a login consumes the transition; a handler may still log in.
                if just_logged_in {
                    ctx.set_was_unauthenticated(false);
                }
                token
            }
        };

        ctx.set_render_arg(policy.param_name.clone(), token);
        Ok(())
    }
}

/// Runs handlers behind their route's CSRF policy.
#[derive(Debug, Clone)]
pub struct CsrfGate {
    registry: Arc<SpecRegistry>,
}

impl CsrfGate {
    pub fn new(registry: SpecRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    pub fn registry(&self) -> &SpecRegistry {
        &self.registry
    }

    /// Serve a request for a registered route.
    pub fn run_route<L, A>(
        &self,
        controller: &str,
        action: &str,
        ctx: &mut ActionContext,
        load_session: L,
        handler: A,
    ) -> HttpResponse
    where
        L: FnOnce(&HttpRequest) -> Session,
        A: FnOnce(&mut ActionContext) -> HttpResponse,
    {
        let spec = self.registry.spec_for(controller, action);
        self.run(spec, ctx, load_session, handler)
    }

    /// Serve a request under `spec`.
    ///
    /// The session stays attached to `ctx` afterwards so the caller can
    /// persist it. A rejection yields the configured rejection response and
    /// the handler is not called.
    pub fn run<L, A>(
        &self,
        spec: &CsrfSpec,
        ctx: &mut ActionContext,
        load_session: L,
        handler: A,
    ) -> HttpResponse
    where
        L: FnOnce(&HttpRequest) -> Session,
        A: FnOnce(&mut ActionContext) -> HttpResponse,
    {
        match Self::execute(spec, ctx, load_session, handler) {
            Ok(()) => std::mem::take(ctx.resp_mut()),
            Err(e) => {
                if !e.is_not_verified() {
                    error!(error = %e, path = %ctx.req().path, "CSRF gate failed");
                }
                e.into_response()
            }
        }
    }

    fn execute<L, A>(
        spec: &CsrfSpec,
        ctx: &mut ActionContext,
        load_session: L,
        handler: A,
    ) -> Result<()>
    where
        L: FnOnce(&HttpRequest) -> Session,
        A: FnOnce(&mut ActionContext) -> HttpResponse,
    {
        spec.pre_check(ctx)?;

        let session = load_session(ctx.req());
        ctx.attach_session(session);
        spec.check(ctx)?;

        spec.set_cookie_and_render_args(ctx)?;
        let response = handler(ctx);
        ctx.resp_mut().merge(response);
        spec.set_cookie_and_render_args(ctx)?;

        Ok(())
    }
}
