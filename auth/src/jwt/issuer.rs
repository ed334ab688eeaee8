use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::encode;
use jsonwebtoken::Algorithm;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;

use super::claims::Claims;
use super::errors::TokenError;
use super::secret::SigningSecret;
use crate::clock::Clock;

/// A freshly signed token together with the claims it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

/// Mints signed session tokens.
///
/// Tokens are compact JWS strings (`header.payload.signature`) signed with
/// HS256 under the process signing secret.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    algorithm: Algorithm,
    default_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenIssuer {
    pub const DEFAULT_TTL_MINUTES: i64 = 15;

    /// Create a new issuer.
    ///
    /// # Arguments
    /// * `secret` - Signing secret shared with the validator
    /// * `clock` - Source of `iat`
    pub fn new(secret: &SigningSecret, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            algorithm: Algorithm::HS256,
            default_ttl: Duration::minutes(Self::DEFAULT_TTL_MINUTES),
            clock,
        }
    }

    /// Override the TTL used by [`TokenIssuer::issue_default`].
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Issue a token for `subject` valid for `ttl` from now.
    ///
    /// # Errors
    /// * `InvalidTtl` - `ttl` is shorter than one second
    /// * `EncodingFailed` - Serialization or signing failed
    pub fn issue(&self, subject: &str, ttl: Duration) -> Result<IssuedToken, TokenError> {
        if ttl.num_seconds() <= 0 {
            return Err(TokenError::InvalidTtl(ttl.num_seconds()));
        }

        let claims = Claims::new(subject, self.clock.now(), ttl);
        let header = Header::new(self.algorithm);

        let token = encode(&header, &claims, &self.encoding_key)
            .map_err(|e| TokenError::EncodingFailed(e.to_string()))?;

        tracing::debug!(
            subject = %claims.sub,
            expires_at = %claims.expires_at(),
            "Token issued"
        );

        Ok(IssuedToken { token, claims })
    }

    /// Issue a token using the issuer's default TTL.
    pub fn issue_default(&self, subject: &str) -> Result<IssuedToken, TokenError> {
        self.issue(subject, self.default_ttl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn issuer() -> (TokenIssuer, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::starting_now());
        let secret = SigningSecret::new("test_secret_key_at_least_32_bytes!").unwrap();
        (TokenIssuer::new(&secret, clock.clone()), clock)
    }

    #[test]
    fn test_issue_has_three_segments() {
        let (issuer, _) = issuer();
        let issued = issuer.issue("alice", Duration::minutes(30)).unwrap();

        assert_eq!(issued.token.split('.').count(), 3);
        assert_eq!(issued.claims.sub, "alice");
        assert_eq!(issued.claims.ttl(), Duration::minutes(30));
    }

    #[test]
    fn test_issue_uses_clock() {
        let (issuer, clock) = issuer();
        let issued = issuer.issue("alice", Duration::minutes(30)).unwrap();

        assert_eq!(issued.claims.issued_at(), clock.now());
    }

    #[test]
    fn test_issue_default_ttl() {
        let (issuer, _) = issuer();
        let issuer = issuer.with_default_ttl(Duration::minutes(30));

        let issued = issuer.issue_default("alice").unwrap();
        assert_eq!(issued.claims.ttl(), Duration::minutes(30));
    }

    #[test]
    fn test_tokens_are_never_reused() {
        let (issuer, clock) = issuer();

        let first = issuer.issue("alice", Duration::minutes(30)).unwrap();
        let same_instant = issuer.issue("alice", Duration::minutes(30)).unwrap();
        clock.advance(Duration::seconds(1));
        let later = issuer.issue("alice", Duration::minutes(30)).unwrap();

        assert_ne!(first.token, same_instant.token);
        assert_ne!(first.token, later.token);
        assert!(later.claims.iat > first.claims.iat);
    }

    #[test]
    fn test_non_positive_ttl_rejected() {
        let (issuer, _) = issuer();

        assert_eq!(
            issuer.issue("alice", Duration::zero()).unwrap_err(),
            TokenError::InvalidTtl(0)
        );
        assert_eq!(
            issuer.issue("alice", Duration::seconds(-5)).unwrap_err(),
            TokenError::InvalidTtl(-5)
        );
    }
}
