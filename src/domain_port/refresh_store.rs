use super::StoreError;
use crate::domain_model::{RefreshRecord, RefreshToken};
use chrono::{DateTime, Utc};

#[async_trait::async_trait]
pub trait RefreshStore: Send + Sync {
    /// Install a record. Fails with `StoreError::Conflict` if the token is already present.
    async fn put(&self, token: &RefreshToken, record: RefreshRecord) -> Result<(), StoreError>;
    async fn get(&self, token: &RefreshToken) -> Result<Option<RefreshRecord>, StoreError>;
    /// Atomically remove and return the record. Of several concurrent callers
    /// for the same token at most one receives `Some`.
    async fn delete(&self, token: &RefreshToken) -> Result<Option<RefreshRecord>, StoreError>;
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, StoreError>;
}
