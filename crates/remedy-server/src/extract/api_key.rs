//! Shared-secret API keys.

use std::fmt;
use std::sync::Arc;

use axum::http::HeaderMap;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Header carrying the shared secret.
pub const API_KEY_HEADER: &str = "x-api-key";

/// A shared secret expected in the [`API_KEY_HEADER`] header.
///
/// Only the SHA-256 digest is kept; presented keys are hashed and compared
/// in constant time, so neither the content nor the length leaks through
/// response timing.
#[derive(Clone)]
pub struct ApiKey {
    digest: Arc<[u8; 32]>,
}

impl ApiKey {
    /// Creates a key from its plain value.
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            digest: Arc::new(Self::digest(secret.as_ref())),
        }
    }

    fn digest(value: &[u8]) -> [u8; 32] {
        Sha256::digest(value).into()
    }

    /// Returns whether `presented` equals the secret.
    pub fn verify(&self, presented: &[u8]) -> bool {
        let presented = Self::digest(presented);
        presented.ct_eq(self.digest.as_ref()).into()
    }

    /// Returns whether `headers` carry the secret.
    ///
    /// A missing or repeated header never matches.
    pub fn verify_headers(&self, headers: &HeaderMap) -> bool {
        let mut values = headers.get_all(API_KEY_HEADER).iter();
        match (values.next(), values.next()) {
            (Some(value), None) => self.verify(value.as_bytes()),
            _ => false,
        }
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKey")
            .field("sha256", &hex::encode(&self.digest[..4]))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn verifies_exact_key_only() {
        let key = ApiKey::new("s3cret");
        assert!(key.verify(b"s3cret"));
        assert!(!key.verify(b"s3cret "));
        assert!(!key.verify(b""));
    }

    #[test]
    fn header_must_be_present_once() {
        let key = ApiKey::new("s3cret");
        let mut headers = HeaderMap::new();
        assert!(!key.verify_headers(&headers));

        headers.insert(API_KEY_HEADER, HeaderValue::from_static("s3cret"));
        assert!(key.verify_headers(&headers));

        headers.append(API_KEY_HEADER, HeaderValue::from_static("s3cret"));
        assert!(!key.verify_headers(&headers));
    }

    #[test]
    fn debug_hides_secret() {
        let key = ApiKey::new("s3cret");
        assert!(!format!("{key:?}").contains("s3cret"));
    }
}
