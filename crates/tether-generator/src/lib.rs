pub mod base62;
pub mod error;

pub use base62::Base62Generator;
pub use error::GeneratorError;

use tether_core::ShortCode;

/// Trait for generating short codes.
///
/// Implementations are pure generators that don't interact with storage.
/// A generated code is only a candidate: two generators (or two processes)
/// may produce the same one, and the link store's create is what decides.
pub trait Generator: Send + Sync + 'static {
    type Output: Into<ShortCode>;

    /// Generates a candidate short code.
    fn generate(&self) -> Result<Self::Output, GeneratorError>;
}
