use super::StoreError;
use crate::domain_model::TokenId;
use chrono::{DateTime, Utc};

/// Access token ids invalidated before their natural expiry.
#[async_trait::async_trait]
pub trait RevocationLedger: Send + Sync {
    /// Record `id` as revoked until `expires_at`. Overwrites a previous entry.
    async fn revoke(&self, id: &TokenId, expires_at: DateTime<Utc>) -> Result<(), StoreError>;
    /// True iff an entry exists for `id` and `now` is before its expiry.
    async fn is_revoked(&self, id: &TokenId, now: DateTime<Utc>) -> Result<bool, StoreError>;
    /// Drop entries that can no longer affect `is_revoked`. Returns how many were removed.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, StoreError>;
}
