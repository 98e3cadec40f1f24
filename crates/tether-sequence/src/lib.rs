mod clock;
mod clock_sequence;
pub mod error;
mod sequence;

pub use clock::{Clock, SystemClock};
pub use clock_sequence::{
    decompose, ClockSequence, ClockSequenceSettings, DEFAULT_EPOCH, MAX_NODE_ID, NODE_ID_BITS,
};
pub use error::Error;
pub use sequence::{CounterSequence, Sequence};
