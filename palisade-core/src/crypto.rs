//! Application crypto service.
//!
//! Values handed to the browser (cookies, hidden form fields) go through a
//! [`Crypto`] implementation so the server can later tell whether it issued
//! them. The default [`HmacCrypto`] seals a value with an HMAC-SHA256 tag
//! keyed by the application secret.

use crate::error::{Error, Result};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;
use std::fmt;

type HmacSha256 = Hmac<Sha256>;

/// Minimum secret length accepted by [`HmacCrypto`].
pub const MIN_SECRET_LEN: usize = 32;

/// Opaque encryption/signing service provided by the application.
pub trait Crypto: Send + Sync {
    /// Turn a raw value into its transport form.
    fn encrypt(&self, raw: &str) -> Result<String>;

    /// Recover the raw value from its transport form.
    fn decrypt(&self, sealed: &str) -> Result<String>;

    /// Sign a payload, returning the signature only.
    fn sign(&self, payload: &str) -> Result<String>;

    /// Check a signature produced by [`Crypto::sign`].
    fn verify_signature(&self, payload: &str, signature: &str) -> bool {
        self.sign(payload)
            .map(|expected| constant_time_eq::constant_time_eq(expected.as_bytes(), signature.as_bytes()))
            .unwrap_or(false)
    }
}

/// HMAC-SHA256 sealing keyed by the application secret.
///
/// Sealed form: `base64url(raw) "." base64url(tag)`.
#[derive(Clone)]
pub struct HmacCrypto {
    secret: Vec<u8>,
}

impl HmacCrypto {
    /// Create a new service. The secret must be at least 32 bytes.
    pub fn new(secret: impl Into<Vec<u8>>) -> Result<Self> {
        let secret = secret.into();
        if secret.len() < MIN_SECRET_LEN {
            return Err(Error::Crypto(format!(
                "Secret key must be at least {} bytes",
                MIN_SECRET_LEN
            )));
        }
        Ok(Self { secret })
    }

    /// Service keyed by a freshly generated secret. Values sealed by it do
    /// not survive a restart.
    pub fn random() -> Self {
        Self {
            secret: Self::generate_secret(),
        }
    }

    /// Generate a random secret key
    pub fn generate_secret() -> Vec<u8> {
        let mut rng = rand::thread_rng();
        (0..MIN_SECRET_LEN).map(|_| rng.r#gen()).collect()
    }

    fn mac(&self) -> Result<HmacSha256> {
        HmacSha256::new_from_slice(&self.secret).map_err(|e| Error::Crypto(e.to_string()))
    }

    fn tag(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut mac = self.mac()?;
        mac.update(data);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

impl fmt::Debug for HmacCrypto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HmacCrypto").finish_non_exhaustive()
    }
}

impl Crypto for HmacCrypto {
    fn encrypt(&self, raw: &str) -> Result<String> {
        let tag = self.tag(raw.as_bytes())?;
        Ok(format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(raw.as_bytes()),
            URL_SAFE_NO_PAD.encode(tag)
        ))
    }

    fn decrypt(&self, sealed: &str) -> Result<String> {
        let (body, tag) = sealed
            .split_once('.')
            .ok_or_else(|| Error::Crypto("malformed sealed value".to_string()))?;

        let raw = URL_SAFE_NO_PAD
            .decode(body)
            .map_err(|e| Error::Crypto(e.to_string()))?;
        let tag = URL_SAFE_NO_PAD
            .decode(tag)
            .map_err(|e| Error::Crypto(e.to_string()))?;

        let mut mac = self.mac()?;
        mac.update(&raw);
        mac.verify_slice(&tag)
            .map_err(|_| Error::Crypto("signature mismatch".to_string()))?;

        String::from_utf8(raw).map_err(|e| Error::Crypto(e.to_string()))
    }

    fn sign(&self, payload: &str) -> Result<String> {
        Ok(URL_SAFE_NO_PAD.encode(self.tag(payload.as_bytes())?))
    }
}

/// Random URL-safe token built from `len` random bytes.
pub fn random_token(len: usize) -> String {
    let mut rng = rand::thread_rng();
    let bytes: Vec<u8> = (0..len).map(|_| rng.r#gen()).collect();
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crypto() -> HmacCrypto {
        HmacCrypto::new(b"test_secret_key_32_bytes_long!!!".to_vec()).unwrap()
    }

    #[test]
    fn test_short_secret_rejected() {
        assert!(HmacCrypto::new(vec![1, 2, 3]).is_err());
        assert_eq!(HmacCrypto::generate_secret().len(), MIN_SECRET_LEN);
    }

    #[test]
    fn test_random_keys_differ() {
        let sealed = HmacCrypto::random().encrypt("payload").unwrap();
        assert!(HmacCrypto::random().decrypt(&sealed).is_err());
    }

    #[test]
    fn test_encrypt_decrypt() {
        let crypto = crypto();
        let sealed = crypto.encrypt("session-1:alice").unwrap();
        assert_ne!(sealed, "session-1:alice");
        assert_eq!(crypto.decrypt(&sealed).unwrap(), "session-1:alice");
    }

    #[test]
    fn test_tampered_value_rejected() {
        let crypto = crypto();
        let sealed = crypto.encrypt("payload").unwrap();
        let (_, tag) = sealed.split_once('.').unwrap();
        let forged = format!("{}.{}", URL_SAFE_NO_PAD.encode("other"), tag);

        assert!(crypto.decrypt(&forged).is_err());
        assert!(crypto.decrypt("no-separator").is_err());
    }

    #[test]
    fn test_wrong_key_rejected() {
        let sealed = crypto().encrypt("payload").unwrap();
        let other = HmacCrypto::new(b"wrong_secret_key_32_bytes_long!!".to_vec()).unwrap();
        assert!(other.decrypt(&sealed).is_err());
    }

    #[test]
    fn test_sign_and_verify() {
        let crypto = crypto();
        let sig = crypto.sign("abc").unwrap();
        assert!(crypto.verify_signature("abc", &sig));
        assert!(!crypto.verify_signature("abd", &sig));
    }

    #[test]
    fn test_random_token() {
        let a = random_token(32);
        let b = random_token(32);
        assert_ne!(a, b);
        assert_eq!(a.len(), 43);
    }
}
