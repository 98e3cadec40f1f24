use crate::{
    clock::{Clock, SystemClock},
    error::Error,
    sequence::Sequence,
};
use jiff::Timestamp;
use std::sync::atomic::{AtomicU64, Ordering};
use typed_builder::TypedBuilder;

/// Low bits of every value carry the node id.
pub const NODE_ID_BITS: u32 = 4;
pub const MAX_NODE_ID: u8 = (1 << NODE_ID_BITS) - 1;
/// Largest millisecond tick that still fits next to the node id.
const MAX_TICK: u64 = (1_u64 << (64 - NODE_ID_BITS)) - 1;

/// 2024-01-01T00:00:00Z
pub const DEFAULT_EPOCH: Timestamp = Timestamp::constant(1_704_067_200, 0);

/// Configures a [`ClockSequence`] instance.
#[derive(Debug, Clone, Copy, TypedBuilder)]
pub struct ClockSequenceSettings {
    /// A node index in the range `[0, 15]`, so processes sharing a store
    /// draw from disjoint value sets.
    #[builder(default = 0)]
    pub node_id: u8,
    /// Custom epoch used as the zero point for the millisecond tick.
    #[builder(default = DEFAULT_EPOCH)]
    pub start_epoch: Timestamp,
}

/// Millisecond-clock sequence with a lock-free monotonic guarantee.
///
/// Each value is `tick << NODE_ID_BITS | node_id`, where `tick` is the number
/// of milliseconds since the configured epoch. Two calls in the same
/// millisecond, or a clock that steps backwards, never repeat a tick: the
/// sequence runs ahead of the clock by one tick per call instead.
pub struct ClockSequence<C: Clock> {
    start_millis: i64,
    node_id: u8,
    clock: C,
    /// Smallest tick the next call may hand out.
    next_tick: AtomicU64,
}

impl ClockSequence<SystemClock> {
    /// Creates a sequence backed by the real system clock.
    pub fn new(settings: ClockSequenceSettings) -> Result<Self, Error> {
        Self::with_clock(settings, SystemClock)
    }
}

impl<C: Clock> ClockSequence<C> {
    /// Creates a sequence reading time from `clock`.
    pub fn with_clock(settings: ClockSequenceSettings, clock: C) -> Result<Self, Error> {
        if settings.node_id > MAX_NODE_ID {
            return Err(Error::InvalidNodeId {
                node_id: settings.node_id,
                max_node_id: MAX_NODE_ID,
            });
        }

        let now = clock.now();
        if settings.start_epoch > now {
            return Err(Error::EpochAhead {
                epoch: settings.start_epoch,
                now,
            });
        }

        Ok(Self {
            start_millis: settings.start_epoch.as_millisecond(),
            node_id: settings.node_id,
            clock,
            next_tick: AtomicU64::new(0),
        })
    }

    /// Generates the next tick: `max(now, previous + 1)`.
    fn next_tick(&self) -> Result<u64, Error> {
        // A clock that went back past the epoch counts as tick 0.
        let elapsed = (self.clock.now().as_millisecond() - self.start_millis).max(0) as u64;

        let floor = self
            .next_tick
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |floor| {
                let tick = elapsed.max(floor);
                (tick <= MAX_TICK).then_some(tick + 1)
            })
            .map_err(|_| Error::OverTimeLimit)?;

        Ok(elapsed.max(floor))
    }
}

impl<C: Clock> Sequence for ClockSequence<C> {
    fn next_value(&self) -> Result<u64, Error> {
        let tick = self.next_tick()?;
        Ok((tick << NODE_ID_BITS) | u64::from(self.node_id))
    }
}

/// Splits a value produced by [`ClockSequence`] into `(tick, node_id)`.
pub fn decompose(value: u64) -> (u64, u8) {
    (value >> NODE_ID_BITS, (value & u64::from(MAX_NODE_ID)) as u8)
}
