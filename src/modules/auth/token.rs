use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Duration, Utc};

/// Fallback lifetime when a token carries no decodable `exp` claim.
const DEFAULT_TTL_SECS: i64 = 1800;

/// Opaque bearer token together with its computed expiry instant.
///
/// Mutated only by login/refresh in the auth manager; read by every
/// outgoing request.
#[derive(Debug, Clone)]
pub struct Token {
    value: String,
    expires_at: DateTime<Utc>,
}

impl Token {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let expires_at = Self::claim_expiry(&value)
            .unwrap_or_else(|| Utc::now() + Duration::seconds(DEFAULT_TTL_SECS));
        Self { value, expires_at }
    }

    /// Expiry from the token's embedded claims: base64url-decode the second
    /// segment, parse JSON, read `exp` (seconds since epoch). Any failure
    /// falls back to the default lifetime.
    fn claim_expiry(raw: &str) -> Option<DateTime<Utc>> {
        let payload = raw.split('.').nth(1)?;
        let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
        let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
        let exp = claims.get("exp")?.as_i64()?;
        DateTime::from_timestamp(exp, 0)
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// True while the token stays valid beyond the given safety margin.
    pub fn is_fresh(&self, margin: Duration) -> bool {
        Utc::now() + margin < self.expires_at
    }
}
