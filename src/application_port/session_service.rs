use crate::domain_model::{AccessClaims, AccessToken, Subject, TokenPair};
use crate::domain_port::StoreError;
use chrono::{DateTime, Utc};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("token invalid")]
    InvalidToken,
    #[error("token expired")]
    ExpiredToken,
    #[error("token revoked")]
    RevokedToken,
    #[error("refresh token unknown or already used")]
    UnknownOrUsedRefreshToken,
    #[error("refresh token expired")]
    ExpiredRefreshToken,
    #[error("store error: {0}")]
    Store(String),
    #[error("internal error: {0}")]
    InternalError(String),
}

impl AuthError {
    /// Everything a client can cause. The HTTP layer folds these into one 401.
    pub fn is_unauthorized(&self) -> bool {
        !matches!(self, AuthError::Store(_) | AuthError::InternalError(_))
    }
}

impl From<StoreError> for AuthError {
    fn from(error: StoreError) -> Self {
        AuthError::Store(error.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct IssuedAccessToken {
    pub token: AccessToken,
    pub claims: AccessClaims,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompactionReport {
    pub revocations_purged: usize,
    pub refresh_tokens_purged: usize,
}

/// Signs and verifies access tokens. Pure computation, no shared state.
pub trait TokenSigner: Send + Sync {
    fn issue(&self, subject: &Subject, now: DateTime<Utc>)
    -> Result<IssuedAccessToken, AuthError>;
    /// Checks encoding, algorithm and signature. Does not look at the time window.
    fn verify(&self, token: &AccessToken) -> Result<AccessClaims, AuthError>;
}

#[async_trait::async_trait]
pub trait SessionService: Send + Sync {
    async fn login(&self, input: LoginInput, now: DateTime<Utc>) -> Result<TokenPair, AuthError>;
    /// Best effort; never fails from the caller's point of view.
    async fn logout(&self, access_token: &str, now: DateTime<Utc>);
    /// Rotate a refresh token into a fresh pair. A presented token is never usable again.
    async fn refresh(&self, refresh_token: &str, now: DateTime<Utc>)
    -> Result<TokenPair, AuthError>;
    async fn authorize(
        &self,
        access_token: &str,
        now: DateTime<Utc>,
    ) -> Result<AccessClaims, AuthError>;

    async fn is_valid(&self, access_token: &str, now: DateTime<Utc>) -> bool {
        self.authorize(access_token, now).await.is_ok()
    }

    async fn compact(&self, now: DateTime<Utc>) -> Result<CompactionReport, AuthError>;
}
