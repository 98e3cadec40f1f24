use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeneratorError {
    #[error("sequence failed: {0}")]
    Sequence(#[from] tether_sequence::Error),
}
