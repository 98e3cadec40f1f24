use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use jiff::Timestamp;
use tether_core::repository::{LinkRecord, LinkStore, ReadLinkStore, Result};
use tether_core::{ShortCode, StorageError};

/// In-memory implementation of the link store using DashMap.
///
/// Every mutation runs under the shard lock of its key, which makes
/// insert-if-absent and the access counter increment atomic per code.
#[derive(Debug, Default)]
pub struct InMemoryLinkStore {
    storage: DashMap<ShortCode, LinkRecord>,
}

impl InMemoryLinkStore {
    /// Creates a new in-memory store.
    pub fn new() -> Self {
        Self {
            storage: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}

fn not_found(code: &ShortCode) -> StorageError {
    StorageError::NotFound(code.to_string())
}

#[async_trait]
impl ReadLinkStore for InMemoryLinkStore {
    async fn get(&self, code: &ShortCode) -> Result<LinkRecord> {
        self.storage
            .get(code)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| not_found(code))
    }
}

#[async_trait]
impl LinkStore for InMemoryLinkStore {
    async fn create(&self, code: &ShortCode, target_url: &str) -> Result<LinkRecord> {
        match self.storage.entry(code.clone()) {
            Entry::Occupied(_) => Err(StorageError::Conflict(code.to_string())),
            Entry::Vacant(slot) => {
                let record = LinkRecord::new(code.clone(), target_url, Timestamp::now());
                slot.insert(record.clone());
                Ok(record)
            }
        }
    }

    async fn update(&self, code: &ShortCode, target_url: &str) -> Result<LinkRecord> {
        let mut entry = self.storage.get_mut(code).ok_or_else(|| not_found(code))?;
        entry.target_url = target_url.to_owned();
        entry.updated_at = Timestamp::now().max(entry.updated_at);
        Ok(entry.clone())
    }

    async fn delete(&self, code: &ShortCode) -> Result<()> {
        self.storage
            .remove(code)
            .map(|_| ())
            .ok_or_else(|| not_found(code))
    }

    async fn increment_access(&self, code: &ShortCode) -> Result<u64> {
        let mut entry = self.storage.get_mut(code).ok_or_else(|| not_found(code))?;
        entry.access_count = entry
            .access_count
            .checked_add(1)
            .ok_or_else(|| StorageError::Operation(format!("access counter overflow: {code}")))?;
        Ok(entry.access_count)
    }
}
