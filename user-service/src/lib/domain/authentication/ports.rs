use async_trait::async_trait;

use crate::domain::authentication::errors::AuthError;
use crate::domain::authentication::models::AccessToken;
use crate::domain::user::models::User;

/// Port for login and session resolution.
#[async_trait]
pub trait AuthenticationServicePort: Send + Sync + 'static {
    /// Check a username/password pair.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown username or wrong password (not distinguished)
    /// * `Store` - Credential store failed
    /// * `Internal` - Password worker failed
    async fn authenticate(&self, username: &str, password: &str) -> Result<User, AuthError>;

    /// Authenticate and issue a session token for the user.
    ///
    /// # Errors
    /// Same as [`AuthenticationServicePort::authenticate`], plus `Internal`
    /// when token signing fails.
    async fn login(&self, username: &str, password: &str) -> Result<AccessToken, AuthError>;

    /// Resolve a bearer token to the user it was issued to.
    ///
    /// # Errors
    /// * `TokenMalformed`, `TokenSignatureInvalid`, `TokenExpired` - Token rejected
    /// * `UserNotFound` - Token is valid but its subject no longer exists
    /// * `Store` - Credential store failed
    async fn resolve_current_user(&self, token: &str) -> Result<User, AuthError>;
}
