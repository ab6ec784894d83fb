use crate::domain_model::{RefreshRecord, RefreshToken};
use crate::domain_port::{RefreshStore, StoreError};
use chrono::{DateTime, Utc};
use dashmap::DashMap;

/// Refresh records held in process memory. Lost on restart.
#[derive(Debug, Default)]
pub struct MemoryRefreshStore {
    records: DashMap<RefreshToken, RefreshRecord>,
}

impl MemoryRefreshStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait::async_trait]
impl RefreshStore for MemoryRefreshStore {
    async fn put(&self, token: &RefreshToken, record: RefreshRecord) -> Result<(), StoreError> {
        let mut inserted = false;
        self.records.entry(token.clone()).or_insert_with(|| {
            inserted = true;
            record
        });
        if inserted {
            Ok(())
        } else {
            Err(StoreError::Conflict)
        }
    }

    async fn get(&self, token: &RefreshToken) -> Result<Option<RefreshRecord>, StoreError> {
        Ok(self.records.get(token).map(|r| r.value().clone()))
    }

    async fn delete(&self, token: &RefreshToken) -> Result<Option<RefreshRecord>, StoreError> {
        Ok(self.records.remove(token).map(|(_, record)| record))
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, StoreError> {
        let mut purged = 0;
        self.records.retain(|_, record| {
            let live = record.is_live(now);
            if !live {
                purged += 1;
            }
            live
        });
        Ok(purged)
    }
}
