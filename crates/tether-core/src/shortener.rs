use crate::repository::LinkRecord;
use crate::shortcode::ShortCode;
use async_trait::async_trait;

type Result<T> = std::result::Result<T, crate::error::ShortenerError>;

/// The link operations exposed to transports such as the HTTP gateway.
///
/// Raw user input goes in; validation, normalization and code allocation
/// happen behind this boundary.
#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Normalizes `url`, allocates a fresh short code and stores the link.
    async fn shorten(&self, url: &str) -> Result<LinkRecord>;

    /// Resolves a short code to its stored record.
    async fn get(&self, code: &ShortCode) -> Result<LinkRecord>;

    /// Points an existing short code at a new (normalized) URL.
    async fn update(&self, code: &ShortCode, url: &str) -> Result<LinkRecord>;

    /// Deletes a shortened URL by its short code.
    async fn delete(&self, code: &ShortCode) -> Result<()>;

    /// Records one access and returns the post-increment count.
    async fn increment_access(&self, code: &ShortCode) -> Result<u64>;

    /// Returns the record together with its usage statistics.
    async fn stats(&self, code: &ShortCode) -> Result<LinkRecord>;
}
