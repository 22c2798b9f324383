// Message slot store and the queue that owns it. One `LogQueue` exists per
// serial channel; it is created once and lives as long as the channel.

use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize};

use super::layout::RingState;
use crate::SPSC::drops::DropAccounting;

/// Number of slots of the firmware trace queue.
pub const QUEUE_SLOTS: usize = 32;

/// Bytes per slot, terminator included.
pub const SLOT_BYTES: usize = 256;

/// A single message slot.
///
/// The payload is written only by the producer, and only while the slot is
/// outside the occupied range `[head, head + count)`. It is read only by the
/// holder of the busy token while the slot sits at `head`.
#[repr(C, align(64))]
pub struct Slot<const S: usize> {
    /// Set when the producer publishes, cleared when the slot is retired.
    pub(crate) in_use: AtomicBool,

    /// Stored byte length, terminator excluded.
    pub(crate) length: AtomicUsize,

    /// Message bytes, always NUL-terminated at `length`.
    pub(crate) payload: UnsafeCell<[u8; S]>,
}

// SAFETY: payload access is partitioned between the single producer (free
// slots) and the busy-token holder (the head slot); `count` carries the
// release/acquire edge between them.
unsafe impl<const S: usize> Sync for Slot<S> {}

impl<const S: usize> Slot<S> {
    pub const fn new() -> Self {
        Self {
            in_use: AtomicBool::new(false),
            length: AtomicUsize::new(0),
            payload: UnsafeCell::new([0u8; S]),
        }
    }
}

impl<const S: usize> Default for Slot<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Lifetime counters behind the diagnostics snapshot.
#[derive(Default)]
pub(crate) struct Counters {
    pub completions: AtomicU64,
    pub spurious_completions: AtomicU64,
    pub corrupt_discards: AtomicU64,
    pub submit_failures: AtomicU64,
    pub transmissions: AtomicU64,
}

/// Bounded transport queue draining text messages over one serial channel.
///
/// `N` slots of `S` bytes each, allocated inline. The producer side is
/// reached through the single [`Producer`](crate::SPSC::Producer) handle;
/// the completion side is [`on_transmission_complete`](Self::on_transmission_complete),
/// callable from the channel's interrupt/async context.
pub struct LogQueue<C, const N: usize = QUEUE_SLOTS, const S: usize = SLOT_BYTES> {
    pub(crate) name: String,
    pub(crate) channel: C,
    pub(crate) slots: [Slot<S>; N],
    pub(crate) ring: RingState,
    pub(crate) drops: DropAccounting,
    pub(crate) counters: Counters,
    pub(crate) drop_notices: bool,
}
