//! URL shortener service implementation.
//!
//! This crate ties the URL normalizer, a code generator and a link store
//! together. Core types are re-exported from `tether_core`.

pub mod service;

pub use service::{ShortenerService, DEFAULT_MAX_ATTEMPTS};
pub use tether_core::{Shortener, ShortenerError};
