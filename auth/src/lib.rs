//! Authentication core library
//!
//! Provides the pieces a service needs to authenticate users without a
//! server-side session store:
//! - Password hashing (Argon2id, configurable work factor)
//! - Session token issuance and validation (HS256 compact JWS)
//! - An `Authenticator` that runs hashing on the blocking pool
//!
//! The signing secret is an explicit [`SigningSecret`] value handed to the
//! issuer and validator; nothing here reads global state.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash));
//! assert!(!hasher.verify("other_password", &hash));
//! ```
//!
//! ## Session Tokens
//! ```
//! use std::sync::Arc;
//!
//! use auth::{SigningSecret, SystemClock, TokenIssuer, TokenValidator};
//! use chrono::Duration;
//!
//! let secret = SigningSecret::new("secret_key_at_least_32_bytes_long!").unwrap();
//! let issuer = TokenIssuer::new(&secret, Arc::new(SystemClock));
//! let validator = TokenValidator::new(&secret, Arc::new(SystemClock));
//!
//! let issued = issuer.issue("alice", Duration::minutes(30)).unwrap();
//! let claims = validator.validate(&issued.token).unwrap();
//! assert_eq!(claims.sub, "alice");
//! ```

pub mod authenticator;
pub mod clock;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::Authenticator;
pub use clock::Clock;
pub use clock::ManualClock;
pub use clock::SystemClock;
pub use jwt::Claims;
pub use jwt::IssuedToken;
pub use jwt::SecretError;
pub use jwt::SigningSecret;
pub use jwt::TokenError;
pub use jwt::TokenIssuer;
pub use jwt::TokenValidator;
pub use password::HashingParams;
pub use password::PasswordError;
pub use password::PasswordHasher;
