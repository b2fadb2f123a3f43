// Configuration validation

use crate::{ConfigError, Result};

/// Trait for validating configuration
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Configuration validator with rules
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate that a value is not blank
    pub fn not_empty(value: &str, field: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "{} cannot be empty",
                field
            )));
        }
        Ok(())
    }

    /// Validate a minimum length in bytes
    pub fn min_len(value: &str, min: usize, field: &str) -> Result<()> {
        if value.len() < min {
            return Err(ConfigError::ValidationError(format!(
                "{} must be at least {} bytes",
                field, min
            )));
        }
        Ok(())
    }

    /// Validate an HTTP token (RFC 9110 `tchar`), as used by header and
    /// cookie names
    pub fn is_token(value: &str, field: &str) -> Result<()> {
        Self::not_empty(value, field)?;
        let valid = value.bytes().all(|b| {
            b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
        });
        if !valid {
            return Err(ConfigError::ValidationError(format!(
                "{} must only contain token characters",
                field
            )));
        }
        Ok(())
    }

    /// Validate a local URL path such as a redirect target
    pub fn is_path(value: &str, field: &str) -> Result<()> {
        if !value.starts_with('/') {
            return Err(ConfigError::ValidationError(format!(
                "{} must start with '/'",
                field
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_empty() {
        assert!(ConfigValidator::not_empty("x", "f").is_ok());
        assert!(ConfigValidator::not_empty("  ", "f").is_err());
    }

    #[test]
    fn test_min_len() {
        assert!(ConfigValidator::min_len("abcd", 4, "secret").is_ok());
        assert!(ConfigValidator::min_len("abc", 4, "secret").is_err());
    }

    #[test]
    fn test_is_token() {
        assert!(ConfigValidator::is_token("X-Xsrf-Token", "header").is_ok());
        assert!(ConfigValidator::is_token("XSRF-TOKEN", "cookie").is_ok());
        assert!(ConfigValidator::is_token("bad name", "header").is_err());
        assert!(ConfigValidator::is_token("a;b", "cookie").is_err());
    }

    #[test]
    fn test_is_path() {
        assert!(ConfigValidator::is_path("/login", "url").is_ok());
        assert!(ConfigValidator::is_path("https://evil.example", "url").is_err());
    }
}
