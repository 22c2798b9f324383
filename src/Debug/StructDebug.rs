use std::fmt;
use std::sync::atomic::Ordering;

use crate::SPSC::Buffer::layout::RingState;
use crate::SPSC::Buffer::{LogQueue, Slot};
use crate::SPSC::Producer;

/// Debug function for LogQueue
///
/// Shows the ring cursors and the diagnostics counters, never slot content
/// (the head slot may be on the wire).
pub fn debug_log_queue<C, const N: usize, const S: usize>(
    queue: &LogQueue<C, N, S>,
    f: &mut fmt::Formatter<'_>,
) -> fmt::Result {
    let stats = queue.stats();
    f.debug_struct("LogQueue")
        .field("name", &queue.name())
        .field("slots", &N)
        .field("slot_bytes", &S)
        .field("ring", &queue.ring)
        .field("state", &stats.state())
        .field("dropped", &stats.dropped)
        .field("pending_drops", &stats.pending_drops)
        .field("completions", &stats.completions)
        .finish_non_exhaustive()
}

pub fn debug_ring_state(ring: &RingState, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("RingState")
        .field("head", &ring.head.load(Ordering::Relaxed))
        .field("tail", &ring.tail.load(Ordering::Relaxed))
        .field("count", &ring.count.load(Ordering::Relaxed))
        .field("busy", &ring.busy.load(Ordering::Relaxed))
        .finish()
}

/// Debug function for Slot
///
/// Length and in-use flag only; the payload is not read.
pub fn debug_slot<const S: usize>(slot: &Slot<S>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Slot")
        .field("in_use", &slot.is_in_use())
        .field("length", &slot.len())
        .field("capacity", &S)
        .finish()
}

// Debug proxy implementations that call the standalone debug functions
impl<C, const N: usize, const S: usize> fmt::Debug for LogQueue<C, N, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        debug_log_queue(self, f)
    }
}

impl fmt::Debug for RingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        debug_ring_state(self, f)
    }
}

impl<const S: usize> fmt::Debug for Slot<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        debug_slot(self, f)
    }
}

impl<C, const N: usize, const S: usize> fmt::Debug for Producer<C, N, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Producer")
            .field("queue", &self.queue().name())
            .finish()
    }
}
