use crossbeam_utils::CachePadded;
use std::sync::atomic::{AtomicBool, AtomicUsize};

/// Ring index state. The single authority for full/empty decisions.
///
/// Ownership of each field:
/// - `tail` is written only by the producer.
/// - `head` is written only by the context holding the `busy` token.
/// - `count` is incremented by the producer (after the slot is filled) and
///   decremented by the busy holder (after the slot is retired).
///
/// Producer and completion side sit on separate cache lines.
#[repr(C)]
pub struct RingState {
    /// Next slot to transmit and retire.
    pub head: CachePadded<AtomicUsize>,

    /// Next slot to fill.
    pub tail: CachePadded<AtomicUsize>,

    /// Occupied slots, `0..=N`.
    pub count: CachePadded<AtomicUsize>,

    /// A transfer of the head slot is in flight (or being started).
    pub busy: CachePadded<AtomicBool>,
}

impl RingState {
    pub const fn new() -> Self {
        Self {
            head: CachePadded::new(AtomicUsize::new(0)),
            tail: CachePadded::new(AtomicUsize::new(0)),
            count: CachePadded::new(AtomicUsize::new(0)),
            busy: CachePadded::new(AtomicBool::new(false)),
        }
    }
}

impl Default for RingState {
    fn default() -> Self {
        Self::new()
    }
}

/// Advance a ring index by one, modulo `n`.
#[inline]
pub const fn advance(index: usize, n: usize) -> usize {
    if index + 1 == n {
        0
    } else {
        index + 1
    }
}
