//! Locating the token a request carries, and exposing the issued token to
//! templates.

use crate::config::CsrfConfig;
use crate::spec::ActivePolicy;
use palisade_core::ActionContext;
use tracing::trace;

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl ActivePolicy {
    /// Token submitted with the request.
    ///
    /// Looks at the prefetch slot, then the header, then the request
    /// parameter, and takes the first non-blank value. A hit is cached in the
    /// prefetch slot.
    pub fn resolve_token(&self, ctx: &mut ActionContext) -> Option<String> {
        if let Some(token) = non_blank(ctx.prefetched_csrf_token().map(String::from)) {
            return Some(token);
        }

        let token = non_blank(ctx.req().header(&self.header_name).map(String::from))
            .map(|t| (t, "header"))
            .or_else(|| non_blank(ctx.param_value(&self.param_name)).map(|t| (t, "param")));

        let (token, source) = token?;
        trace!(source, "CSRF token located");
        ctx.set_prefetched_csrf_token(token.clone());
        Some(token)
    }
}

/// Token issued for the current request, as handed to templates.
pub fn token<'a>(ctx: &'a ActionContext, config: &CsrfConfig) -> Option<&'a str> {
    ctx.render_arg(&config.param_name)
}

/// Hidden form input carrying the current token, or an empty string when
/// no token was issued.
pub fn form_field(ctx: &ActionContext, config: &CsrfConfig) -> String {
    match token(ctx, config) {
        Some(token) => format!(
            "<input type='hidden' name='{}' value='{}'>",
            config.param_name, token
        ),
        None => String::new(),
    }
}
