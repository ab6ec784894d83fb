#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("key already present")]
    Conflict,
    #[error("invalid stored credential: {0}")]
    InvalidCredential(String),
    #[error("store backend error: {0}")]
    Backend(String),
}
