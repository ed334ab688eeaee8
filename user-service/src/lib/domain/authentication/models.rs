use chrono::DateTime;
use chrono::Utc;

/// Bearer token handed out by a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_at: DateTime<Utc>,
    /// Seconds of validity from issuance
    pub expires_in: i64,
}

impl AccessToken {
    pub const TOKEN_TYPE: &'static str = "bearer";

    pub fn from_issued(issued: auth::IssuedToken) -> Self {
        Self {
            expires_at: issued.claims.expires_at(),
            expires_in: issued.claims.ttl().num_seconds(),
            access_token: issued.token,
            token_type: Self::TOKEN_TYPE,
        }
    }
}
