use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::DateTime;
use chrono::Duration;
use jsonwebtoken::decode;
use jsonwebtoken::decode_header;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::errors::TokenError;
use super::secret::SigningSecret;
use crate::clock::Clock;

/// Verifies session tokens and extracts their claims.
///
/// Checks run in a fixed order: structure, then signature, then expiry.
/// Input that does not parse as a token never reaches the MAC comparison, and
/// expiry is only trusted once the signature is known to be good.
pub struct TokenValidator {
    decoding_key: DecodingKey,
    validation: Validation,
    leeway: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenValidator {
    pub const DEFAULT_LEEWAY_SECONDS: i64 = 5;

    /// Create a new validator.
    ///
    /// # Arguments
    /// * `secret` - Signing secret shared with the issuer
    /// * `clock` - Source of "now" for expiry checks
    pub fn new(secret: &SigningSecret, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against our own clock after signature verification
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            leeway: Duration::seconds(Self::DEFAULT_LEEWAY_SECONDS),
            clock,
        }
    }

    /// Set the clock-skew tolerance applied past `exp`.
    pub fn with_leeway(mut self, leeway: Duration) -> Self {
        self.leeway = leeway;
        self
    }

    pub fn leeway(&self) -> Duration {
        self.leeway
    }

    /// Validate a token and return its claims.
    ///
    /// # Errors
    /// * `Malformed` - Wrong segment count, bad base64url, unexpected header
    ///   algorithm, missing or unknown claim fields, out-of-range timestamps,
    ///   or `exp <= iat`
    /// * `SignatureInvalid` - MAC does not match header and payload
    /// * `Expired` - `now >= exp + leeway`
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        check_structure(token)?;

        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(map_jwt_error)?
            .claims;

        if DateTime::from_timestamp(claims.iat, 0).is_none()
            || DateTime::from_timestamp(claims.exp, 0).is_none()
        {
            return Err(TokenError::Malformed(
                "timestamp out of range".to_string(),
            ));
        }

        if claims.exp <= claims.iat {
            return Err(TokenError::Malformed(
                "expiration is not after issued-at".to_string(),
            ));
        }

        if claims.is_expired(self.clock.now(), self.leeway) {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

/// Decode every segment without touching the key: header must name HS256,
/// payload must be exactly our claims, signature must be base64url.
fn check_structure(token: &str) -> Result<(), TokenError> {
    let segments: Vec<&str> = token.split('.').collect();
    let [_, payload, signature] = segments.as_slice() else {
        return Err(TokenError::Malformed(
            "expected three dot-separated segments".to_string(),
        ));
    };

    let header = decode_header(token).map_err(|e| TokenError::Malformed(e.to_string()))?;
    if header.alg != Algorithm::HS256 {
        return Err(TokenError::Malformed(format!(
            "unexpected algorithm {:?}",
            header.alg
        )));
    }

    let payload = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| TokenError::Malformed(format!("payload: {e}")))?;
    serde_json::from_slice::<Claims>(&payload)
        .map_err(|e| TokenError::Malformed(format!("claims: {e}")))?;

    URL_SAFE_NO_PAD
        .decode(signature)
        .map_err(|e| TokenError::Malformed(format!("signature: {e}")))?;

    Ok(())
}

fn map_jwt_error(error: jsonwebtoken::errors::Error) -> TokenError {
    match error.kind() {
        ErrorKind::InvalidSignature => TokenError::SignatureInvalid,
        _ => TokenError::Malformed(error.to_string()),
    }
}
