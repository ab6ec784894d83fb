use crate::domain_model::TokenId;
use crate::domain_port::{RevocationLedger, StoreError};
use chrono::{DateTime, Utc};
use dashmap::DashMap;

/// Revoked access token ids mapped to the expiry of the token they belonged to.
/// Entries past that expiry are inert until purged.
#[derive(Debug, Default)]
pub struct MemoryRevocationLedger {
    entries: DashMap<TokenId, DateTime<Utc>>,
}

impl MemoryRevocationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait::async_trait]
impl RevocationLedger for MemoryRevocationLedger {
    async fn revoke(&self, id: &TokenId, expires_at: DateTime<Utc>) -> Result<(), StoreError> {
        self.entries.insert(id.clone(), expires_at);
        Ok(())
    }

    async fn is_revoked(&self, id: &TokenId, now: DateTime<Utc>) -> Result<bool, StoreError> {
        Ok(self
            .entries
            .get(id)
            .is_some_and(|expires_at| now < *expires_at))
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, StoreError> {
        let mut purged = 0;
        self.entries.retain(|_, expires_at| {
            let live = now < *expires_at;
            if !live {
                purged += 1;
            }
            live
        });
        Ok(purged)
    }
}
