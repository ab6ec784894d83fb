use super::{Subject, TokenId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Claims embedded in a signed access token. Timestamps are unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
    pub iss: String,
    pub aud: String,
}

impl AccessClaims {
    pub fn subject(&self) -> Subject {
        Subject(self.sub.clone())
    }

    /// An empty `jti` counts as no id at all.
    pub fn token_id(&self) -> Option<TokenId> {
        self.jti
            .as_deref()
            .filter(|jti| !jti.is_empty())
            .map(|jti| TokenId(jti.to_owned()))
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        from_unix(self.iat)
    }

    pub fn not_before(&self) -> DateTime<Utc> {
        from_unix(self.nbf)
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        from_unix(self.exp)
    }
}

// Out-of-range timestamps collapse to the epoch, which every window check rejects.
fn from_unix(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}
