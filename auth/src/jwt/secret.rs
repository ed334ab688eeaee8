use std::fmt;
use std::sync::Arc;

use super::errors::SecretError;

/// HMAC key material shared by the issuer and the validator.
///
/// Built once at startup and cloned cheaply afterwards; the bytes are never
/// mutated.
#[derive(Clone)]
pub struct SigningSecret(Arc<[u8]>);

impl SigningSecret {
    /// Below this length HS256 keys are weaker than the hash output.
    pub const RECOMMENDED_MIN_LENGTH: usize = 32;

    /// Create a signing secret.
    ///
    /// # Errors
    /// * `Empty` - No key material was provided
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, SecretError> {
        let bytes = secret.as_ref();
        if bytes.is_empty() {
            return Err(SecretError::Empty);
        }

        if bytes.len() < Self::RECOMMENDED_MIN_LENGTH {
            tracing::warn!(
                length = bytes.len(),
                recommended = Self::RECOMMENDED_MIN_LENGTH,
                "Signing secret is shorter than recommended"
            );
        }

        Ok(Self(Arc::from(bytes)))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningSecret")
            .field("len", &self.0.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_secret_rejected() {
        assert_eq!(SigningSecret::new("").unwrap_err(), SecretError::Empty);
        assert_eq!(SigningSecret::new(Vec::<u8>::new()).unwrap_err(), SecretError::Empty);
    }

    #[test]
    fn test_short_secret_accepted() {
        let secret = SigningSecret::new("short").unwrap();
        assert_eq!(secret.as_bytes(), b"short");
    }

    #[test]
    fn test_debug_does_not_leak_bytes() {
        let secret = SigningSecret::new("super_secret_value_at_least_32_bytes").unwrap();
        let rendered = format!("{:?}", secret);

        assert!(!rendered.contains("super_secret"));
        assert!(rendered.contains("len"));
    }
}
