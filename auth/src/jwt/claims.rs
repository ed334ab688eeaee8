use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// Session token claims.
///
/// Fixed shape: every field is required and unknown fields are rejected when
/// decoding, so a token either carries exactly these claims or is malformed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Claims {
    /// Subject (username the token was issued to)
    pub sub: String,

    /// Issued at (Unix timestamp, seconds)
    pub iat: i64,

    /// Expiration time (Unix timestamp, seconds)
    pub exp: i64,

    /// Token identifier, random per issuance
    pub jti: String,
}

impl Claims {
    /// Build claims for `subject` valid for `ttl` starting at `issued_at`.
    ///
    /// Timestamps are truncated to whole seconds.
    pub fn new(subject: impl Into<String>, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        let iat = issued_at.timestamp();

        Self {
            sub: subject.into(),
            iat,
            exp: iat + ttl.num_seconds(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    pub fn subject(&self) -> &str {
        &self.sub
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        timestamp_to_datetime(self.iat)
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        timestamp_to_datetime(self.exp)
    }

    /// Lifetime the token was issued with.
    pub fn ttl(&self) -> Duration {
        Duration::seconds(self.exp - self.iat)
    }

    /// Check whether the token is expired at `now`, tolerating `leeway` of
    /// clock skew past `exp`.
    pub fn is_expired(&self, now: DateTime<Utc>, leeway: Duration) -> bool {
        now.timestamp() >= self.exp.saturating_add(leeway.num_seconds())
    }
}

fn timestamp_to_datetime(seconds: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(seconds, 0).unwrap_or(DateTime::<Utc>::MAX_UTC)
}
