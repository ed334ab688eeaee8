use std::sync::Arc;

use chrono::Duration;
use tokio::sync::OnceCell;
use tokio::sync::Semaphore;

use crate::clock::Clock;
use crate::clock::SystemClock;
use crate::jwt::Claims;
use crate::jwt::IssuedToken;
use crate::jwt::SigningSecret;
use crate::jwt::TokenError;
use crate::jwt::TokenIssuer;
use crate::jwt::TokenValidator;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Authentication coordinator combining password hashing and session tokens.
///
/// Hashing and verification are CPU-heavy, so they run on tokio's
/// blocking pool and at most `max_concurrent_hashes` of them run at once.
/// Token operations are cheap and run inline.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    token_issuer: TokenIssuer,
    token_validator: TokenValidator,
    hashing_permits: Arc<Semaphore>,
    dummy_hash: OnceCell<String>,
}

impl Authenticator {
    pub const DEFAULT_SESSION_TTL_MINUTES: i64 = 30;
    pub const DEFAULT_MAX_CONCURRENT_HASHES: usize = 4;

    /// Create a new authenticator using the wall clock.
    ///
    /// # Arguments
    /// * `secret` - Secret key for token signing
    pub fn new(secret: &SigningSecret) -> Self {
        Self::with_clock(secret, Arc::new(SystemClock))
    }

    /// Create a new authenticator reading time from `clock`.
    pub fn with_clock(secret: &SigningSecret, clock: Arc<dyn Clock>) -> Self {
        Self {
            password_hasher: PasswordHasher::new(),
            token_issuer: TokenIssuer::new(secret, Arc::clone(&clock))
                .with_default_ttl(Duration::minutes(Self::DEFAULT_SESSION_TTL_MINUTES)),
            token_validator: TokenValidator::new(secret, clock),
            hashing_permits: Arc::new(Semaphore::new(Self::DEFAULT_MAX_CONCURRENT_HASHES)),
            dummy_hash: OnceCell::new(),
        }
    }

    pub fn with_password_hasher(mut self, password_hasher: PasswordHasher) -> Self {
        self.password_hasher = password_hasher;
        self
    }

    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.token_issuer = self.token_issuer.with_default_ttl(ttl);
        self
    }

    pub fn with_leeway(mut self, leeway: Duration) -> Self {
        self.token_validator = self.token_validator.with_leeway(leeway);
        self
    }

    /// Bound the number of hash/verify jobs running at the same time.
    /// Values below one are raised to one.
    pub fn with_max_concurrent_hashes(mut self, permits: usize) -> Self {
        self.hashing_permits = Arc::new(Semaphore::new(permits.max(1)));
        self
    }

    pub fn session_ttl(&self) -> Duration {
        self.token_issuer.default_ttl()
    }

    /// Hash a password for storage.
    ///
    /// # Arguments
    /// * `password` - Plaintext password
    ///
    /// # Returns
    /// Hashed password string
    ///
    /// # Errors
    /// * `HashingFailed` - Hashing operation failed
    /// * `WorkerFailed` - The blocking task panicked or was cancelled
    pub async fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        let hasher = self.password_hasher.clone();
        let password = password.to_owned();

        self.run_hashing_job(move || hasher.hash(&password)).await?
    }

    /// Verify a password against a stored hash.
    ///
    /// # Returns
    /// True if the password matches; false on mismatch or an unreadable hash
    ///
    /// # Errors
    /// * `WorkerFailed` - The blocking task panicked or was cancelled
    pub async fn verify_password(
        &self,
        password: &str,
        stored_hash: &str,
    ) -> Result<bool, PasswordError> {
        let hasher = self.password_hasher.clone();
        let password = password.to_owned();
        let stored_hash = stored_hash.to_owned();

        self.run_hashing_job(move || hasher.verify(&password, &stored_hash))
            .await
    }

    /// Spend the same work as a real verification when there is no stored
    /// hash to check against, so a missing account takes as long to reject
    /// as a wrong password.
    pub async fn simulate_verification(&self, password: &str) -> Result<(), PasswordError> {
        let dummy_hash = self
            .dummy_hash
            .get_or_try_init(|| self.hash_password("dummy-password-for-timing"))
            .await?;

        self.verify_password(password, dummy_hash).await?;
        Ok(())
    }

    /// Issue a session token for `subject` with the session TTL.
    ///
    /// # Errors
    /// * `TokenError` - Token generation failed
    pub fn issue_token(&self, subject: &str) -> Result<IssuedToken, TokenError> {
        self.token_issuer.issue_default(subject)
    }

    /// Validate and decode a session token.
    ///
    /// # Errors
    /// * `Malformed`, `SignatureInvalid` or `Expired`
    pub fn validate_token(&self, token: &str) -> Result<Claims, TokenError> {
        self.token_validator.validate(token)
    }

    async fn run_hashing_job<T, F>(&self, job: F) -> Result<T, PasswordError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let _permit = self
            .hashing_permits
            .acquire()
            .await
            .map_err(|e| PasswordError::WorkerFailed(e.to_string()))?;

        tokio::task::spawn_blocking(job)
            .await
            .map_err(|e| PasswordError::WorkerFailed(e.to_string()))
    }
}
