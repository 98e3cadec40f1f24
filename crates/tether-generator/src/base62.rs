use crate::{Generator, GeneratorError};
use tether_core::base62;
use tether_core::ShortCode;
use tether_sequence::Sequence;
use typed_builder::TypedBuilder;

pub const DEFAULT_MIN_WIDTH: usize = 6;

/// Encodes values from a [`Sequence`] as base62 short codes.
///
/// Codes are left-padded with `'0'` to `min_width`, which keeps them
/// non-empty even for the value `0` and does not change what they decode to.
#[derive(Debug, TypedBuilder)]
pub struct Base62Generator<S: Sequence> {
    sequence: S,
    #[builder(default = DEFAULT_MIN_WIDTH, setter(transform = |width: usize| width.max(1)))]
    min_width: usize,
}

impl<S: Sequence> Base62Generator<S> {
    pub fn min_width(&self) -> usize {
        self.min_width
    }

    /// Encodes one value the same way [`Generator::generate`] does.
    pub fn encode(&self, value: u64) -> ShortCode {
        ShortCode::new_unchecked(base62::pad(base62::encode(value), self.min_width))
    }
}

impl<S: Sequence + 'static> Generator for Base62Generator<S> {
    type Output = ShortCode;

    fn generate(&self) -> Result<Self::Output, GeneratorError> {
        let value = self.sequence.next_value()?;
        Ok(self.encode(value))
    }
}
