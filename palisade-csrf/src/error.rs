use palisade_core::HttpResponse;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CsrfError {
    /// The request carried no token, or one that failed verification. Holds
    /// the response produced by the configured rejection handler.
    #[error("CSRF token not verified")]
    NotVerified(Box<HttpResponse>),

    #[error("Token validation failed: {0}")]
    ValidationFailed(String),

    #[error(transparent)]
    Core(#[from] palisade_core::Error),

    #[cfg(feature = "config")]
    #[error(transparent)]
    Config(#[from] palisade_config::ConfigError),
}

impl CsrfError {
    pub fn is_not_verified(&self) -> bool {
        matches!(self, CsrfError::NotVerified(_))
    }

    /// Response to send for this error.
    pub fn into_response(self) -> HttpResponse {
        match self {
            CsrfError::NotVerified(response) => *response,
            CsrfError::Core(e) => HttpResponse::new(e.status_code()),
            _ => HttpResponse::internal_server_error(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CsrfError>;
