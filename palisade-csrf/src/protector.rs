//! Token protectors.
//!
//! A [`CsrfProtector`] decides what a CSRF token is and how it is bound to a
//! session. Tokens leave the server encrypted by the application
//! [`Crypto`] service; protectors receive the encrypted form when verifying
//! and produce the raw form when generating.

use crate::error::Result;
use palisade_core::{ActionContext, Crypto, Session, random_token};
use std::sync::Arc;

/// Number of random bytes in a [`RandomProtector`] token.
pub const RANDOM_TOKEN_BYTES: usize = 32;

/// Pluggable token generation, storage and verification.
pub trait CsrfProtector: Send + Sync {
    /// Check an encrypted token against the session.
    ///
    /// `Ok(false)` is an ordinary mismatch; `Err` means the token could not
    /// be processed at all (malformed, tampered, storage failure).
    fn verify_token(
        &self,
        token: &str,
        session: &Session,
        cookie_name: &str,
        crypto: &dyn Crypto,
    ) -> Result<bool>;

    /// Encrypted token already bound to the session, if any.
    fn retrieve_token(
        &self,
        session: &Session,
        cookie_name: &str,
        crypto: &dyn Crypto,
    ) -> Result<Option<String>>;

    /// Forget any token bound to the session.
    fn clear_existing_token(&self, session: &mut Session, cookie_name: &str) -> Result<()>;

    /// Create a new raw token bound to the session.
    fn generate_token(
        &self,
        session: &mut Session,
        cookie_name: &str,
        crypto: &dyn Crypto,
    ) -> Result<String>;

    /// Extra output for a freshly issued token, beyond the cookie.
    fn output_token(
        &self,
        _token: &str,
        _cookie_name: &str,
        _cookie_domain: Option<&str>,
        _ctx: &mut ActionContext,
    ) {
    }
}

impl<P: CsrfProtector + ?Sized> CsrfProtector for Arc<P> {
    fn verify_token(
        &self,
        token: &str,
        session: &Session,
        cookie_name: &str,
        crypto: &dyn Crypto,
    ) -> Result<bool> {
        (**self).verify_token(token, session, cookie_name, crypto)
    }

    fn retrieve_token(
        &self,
        session: &Session,
        cookie_name: &str,
        crypto: &dyn Crypto,
    ) -> Result<Option<String>> {
        (**self).retrieve_token(session, cookie_name, crypto)
    }

    fn clear_existing_token(&self, session: &mut Session, cookie_name: &str) -> Result<()> {
        (**self).clear_existing_token(session, cookie_name)
    }

    fn generate_token(
        &self,
        session: &mut Session,
        cookie_name: &str,
        crypto: &dyn Crypto,
    ) -> Result<String> {
        (**self).generate_token(session, cookie_name, crypto)
    }

    fn output_token(
        &self,
        token: &str,
        cookie_name: &str,
        cookie_domain: Option<&str>,
        ctx: &mut ActionContext,
    ) {
        (**self).output_token(token, cookie_name, cookie_domain, ctx)
    }
}

fn tokens_match(a: &str, b: &str) -> bool {
    constant_time_eq::constant_time_eq(a.as_bytes(), b.as_bytes())
}

// ============================================================================
// HMAC
// ============================================================================

/// Stateless protector: the token is a signature over the session id and
/// username. Neither appears in the token itself.
///
/// Nothing is stored in the session, so the token for a given session and
/// user is always the same and changes when the user logs in or out.
#[derive(Debug, Clone, Copy, Default)]
pub struct HmacProtector;

impl HmacProtector {
    fn payload(session: &Session) -> String {
        format!("{}:{}", session.id, session.username().unwrap_or_default())
    }

    fn raw_token(session: &Session, crypto: &dyn Crypto) -> Result<String> {
        Ok(crypto.sign(&Self::payload(session))?)
    }
}

impl CsrfProtector for HmacProtector {
    fn verify_token(
        &self,
        token: &str,
        session: &Session,
        _cookie_name: &str,
        crypto: &dyn Crypto,
    ) -> Result<bool> {
        let signature = crypto.decrypt(token)?;
        Ok(crypto.verify_signature(&Self::payload(session), &signature))
    }

    fn retrieve_token(
        &self,
        _session: &Session,
        _cookie_name: &str,
        _crypto: &dyn Crypto,
    ) -> Result<Option<String>> {
        Ok(None)
    }

    fn clear_existing_token(&self, _session: &mut Session, _cookie_name: &str) -> Result<()> {
        Ok(())
    }

    fn generate_token(
        &self,
        session: &mut Session,
        _cookie_name: &str,
        crypto: &dyn Crypto,
    ) -> Result<String> {
        Self::raw_token(session, crypto)
    }
}

// ============================================================================
// Random
// ============================================================================

/// Stateful protector: a random token kept in the session under the cookie
/// name.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomProtector;

impl CsrfProtector for RandomProtector {
    fn verify_token(
        &self,
        token: &str,
        session: &Session,
        cookie_name: &str,
        crypto: &dyn Crypto,
    ) -> Result<bool> {
        let Some(stored) = session.get_str(cookie_name) else {
            return Ok(false);
        };
        let raw = crypto.decrypt(token)?;
        Ok(tokens_match(&raw, stored))
    }

    fn retrieve_token(
        &self,
        session: &Session,
        cookie_name: &str,
        crypto: &dyn Crypto,
    ) -> Result<Option<String>> {
        match session.get_str(cookie_name) {
            Some(raw) if !raw.is_empty() => Ok(Some(crypto.encrypt(raw)?)),
            _ => Ok(None),
        }
    }

    fn clear_existing_token(&self, session: &mut Session, cookie_name: &str) -> Result<()> {
        session.remove(cookie_name);
        Ok(())
    }

    fn generate_token(
        &self,
        session: &mut Session,
        cookie_name: &str,
        _crypto: &dyn Crypto,
    ) -> Result<String> {
        let token = random_token(RANDOM_TOKEN_BYTES);
        session.set(cookie_name, &token)?;
        Ok(token)
    }
}

// ============================================================================
// Header mirror
// ============================================================================

/// Wraps another protector and also sends each freshly issued token in a
/// response header, for clients that cannot read cookies.
#[derive(Clone)]
pub struct HeaderMirror<P> {
    inner: P,
    header_name: String,
}

impl<P: CsrfProtector> HeaderMirror<P> {
    pub fn new(inner: P, header_name: impl Into<String>) -> Self {
        Self {
            inner,
            header_name: header_name.into(),
        }
    }
}

impl<P: CsrfProtector> CsrfProtector for HeaderMirror<P> {
    fn verify_token(
        &self,
        token: &str,
        session: &Session,
        cookie_name: &str,
        crypto: &dyn Crypto,
    ) -> Result<bool> {
        self.inner.verify_token(token, session, cookie_name, crypto)
    }

    fn retrieve_token(
        &self,
        session: &Session,
        cookie_name: &str,
        crypto: &dyn Crypto,
    ) -> Result<Option<String>> {
        self.inner.retrieve_token(session, cookie_name, crypto)
    }

    fn clear_existing_token(&self, session: &mut Session, cookie_name: &str) -> Result<()> {
        self.inner.clear_existing_token(session, cookie_name)
    }

    fn generate_token(
        &self,
        session: &mut Session,
        cookie_name: &str,
        crypto: &dyn Crypto,
    ) -> Result<String> {
        self.inner.generate_token(session, cookie_name, crypto)
    }

    fn output_token(
        &self,
        token: &str,
        cookie_name: &str,
        cookie_domain: Option<&str>,
        ctx: &mut ActionContext,
    ) {
        self.inner.output_token(token, cookie_name, cookie_domain, ctx);
        ctx.resp_mut().set_header(self.header_name.clone(), token);
    }
}
