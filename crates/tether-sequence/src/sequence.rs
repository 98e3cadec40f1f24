use crate::error::Error;
use std::sync::atomic::{AtomicU64, Ordering};

/// A source of integers for short code generation.
///
/// Implementations must be safe to call from many threads at once without
/// external locking. Successive values from one instance should not repeat,
/// but callers never rely on that for correctness: the store rejects a
/// duplicate code and the caller simply asks for another value.
pub trait Sequence: Send + Sync {
    fn next_value(&self) -> Result<u64, Error>;
}

/// A plain atomic counter.
///
/// Produces `offset`, `offset + 1`, ... Useful for tests and for deployments
/// that hand out disjoint counter ranges per node.
#[derive(Debug)]
pub struct CounterSequence {
    counter: AtomicU64,
}

impl CounterSequence {
    pub fn new() -> Self {
        Self::with_offset(0)
    }

    /// Creates a counter starting from a specific value.
    pub fn with_offset(offset: u64) -> Self {
        Self {
            counter: AtomicU64::new(offset),
        }
    }
}

impl Default for CounterSequence {
    fn default() -> Self {
        Self::new()
    }
}

impl Sequence for CounterSequence {
    fn next_value(&self) -> Result<u64, Error> {
        self.counter
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_add(1))
            .map_err(|_| Error::Exhausted)
    }
}
