use auth::PasswordError;
use auth::TokenError;
use thiserror::Error;

use crate::user::errors::UserError;

/// Failures of login and session resolution.
///
/// Variants stay distinct for logging; the HTTP boundary collapses all of
/// them except infrastructure errors into one unauthorized response.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown username or wrong password. Deliberately carries no detail.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("No user matches token subject: {0}")]
    UserNotFound(String),

    #[error("Token is malformed: {0}")]
    TokenMalformed(String),

    #[error("Token signature is invalid")]
    TokenSignatureInvalid,

    #[error("Token is expired")]
    TokenExpired,

    // Infrastructure errors
    #[error("Credential store error: {0}")]
    Store(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Malformed(reason) => AuthError::TokenMalformed(reason),
            TokenError::SignatureInvalid => AuthError::TokenSignatureInvalid,
            TokenError::Expired => AuthError::TokenExpired,
            TokenError::InvalidTtl(_) | TokenError::EncodingFailed(_) => {
                AuthError::Internal(err.to_string())
            }
        }
    }
}

impl From<PasswordError> for AuthError {
    fn from(err: PasswordError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

impl From<UserError> for AuthError {
    fn from(err: UserError) -> Self {
        AuthError::Store(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_errors_map_to_auth_errors() {
        assert_eq!(
            AuthError::from(TokenError::Malformed("bad".to_string())),
            AuthError::TokenMalformed("bad".to_string())
        );
        assert_eq!(
            AuthError::from(TokenError::SignatureInvalid),
            AuthError::TokenSignatureInvalid
        );
        assert_eq!(AuthError::from(TokenError::Expired), AuthError::TokenExpired);
        assert!(matches!(
            AuthError::from(TokenError::InvalidTtl(0)),
            AuthError::Internal(_)
        ));
    }

    #[test]
    fn test_invalid_credentials_message_is_generic() {
        assert_eq!(AuthError::InvalidCredentials.to_string(), "Invalid credentials");
    }
}
