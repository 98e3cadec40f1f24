use crate::error::StorageError;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Result type for link store operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// A persisted link: one short code bound to one target URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    /// The short code; unique across all live records.
    pub code: ShortCode,
    /// The normalized absolute URL the code points at.
    pub target_url: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    /// Number of recorded accesses. Only [`LinkStore::increment_access`] changes it.
    pub access_count: u64,
}

impl LinkRecord {
    /// Builds a fresh record as it looks right after creation.
    pub fn new(code: ShortCode, target_url: impl Into<String>, now: Timestamp) -> Self {
        Self {
            code,
            target_url: target_url.into(),
            created_at: now,
            updated_at: now,
            access_count: 0,
        }
    }
}

/// A read-only view of a link store.
#[async_trait]
pub trait ReadLinkStore: Send + Sync + 'static {
    /// Retrieves the record for a given short code.
    /// Returns `Err(NotFound)` if the code does not exist.
    async fn get(&self, code: &ShortCode) -> Result<LinkRecord>;

    /// Returns the full record including its access counter.
    async fn stats(&self, code: &ShortCode) -> Result<LinkRecord> {
        self.get(code).await
    }
}

/// The sole authority on code uniqueness and the only mutator of persisted links.
///
/// Every operation is a single atomic step against the backend, so dropping
/// the returned future never leaves a partially applied mutation behind.
#[async_trait]
pub trait LinkStore: ReadLinkStore {
    /// Inserts a new record. Returns `Err(Conflict)` if the code already exists;
    /// the existing record is left untouched.
    async fn create(&self, code: &ShortCode, target_url: &str) -> Result<LinkRecord>;

    /// Replaces the target URL and bumps `updated_at`.
    /// Returns `Err(NotFound)` if the code does not exist.
    async fn update(&self, code: &ShortCode, target_url: &str) -> Result<LinkRecord>;

    /// Permanently removes the record, freeing the code.
    /// Returns `Err(NotFound)` if the code does not exist.
    async fn delete(&self, code: &ShortCode) -> Result<()>;

    /// Atomically adds one to the access counter and returns the new value.
    /// Returns `Err(NotFound)` if the code does not exist.
    async fn increment_access(&self, code: &ShortCode) -> Result<u64>;
}
