//! Core types and traits for the Tether URL shortener.
//!
//! This crate provides the domain types shared by the code generator, the
//! link stores, the shortener service and the HTTP gateway.

pub mod base62;
pub mod error;
pub mod repository;
pub mod shortcode;
pub mod shortener;
pub mod url;

pub use error::{CoreError, ShortenerError, StorageError};
pub use repository::{LinkRecord, LinkStore, ReadLinkStore};
pub use shortcode::ShortCode;
pub use shortener::Shortener;
pub use url::normalize_url;
