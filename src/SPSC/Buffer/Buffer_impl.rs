use std::ptr;
use std::sync::atomic::Ordering::{Acquire, Relaxed, Release, SeqCst};

use super::layout::{advance, RingState};
use super::Buffer::{Counters, LogQueue, Slot};
use crate::error::QueueError;
use crate::SPSC::drops::DropAccounting;
use crate::SPSC::Structs::Buffer_Structs::{QueueStats, TxState};

impl<const S: usize> Slot<S> {
    /// Largest message a slot stores; one byte is kept for the terminator.
    pub const MAX_MESSAGE: usize = S - 1;

    /// Copy `message` in, truncated to `S - 1` bytes and NUL-terminated.
    /// Returns the stored length.
    ///
    /// # Safety
    /// Caller is the producer and the slot is outside the occupied range.
    pub(crate) unsafe fn fill(&self, message: &[u8]) -> usize {
        let len = message.len().min(Self::MAX_MESSAGE);
        let payload = &mut *self.payload.get();
        ptr::copy_nonoverlapping(message.as_ptr(), payload.as_mut_ptr(), len);
        payload[len] = 0;
        self.length.store(len, Relaxed);
        len
    }

    /// Stored content, `length` bytes, terminator excluded.
    ///
    /// # Safety
    /// Caller holds the busy token and the slot is at `head`, or the caller
    /// otherwise knows the producer cannot be writing it.
    pub(crate) unsafe fn bytes(&self, length: usize) -> &[u8] {
        let payload = &*self.payload.get();
        &payload[..length.min(S)]
    }

    pub fn is_in_use(&self) -> bool {
        self.in_use.load(Acquire)
    }

    pub fn len(&self) -> usize {
        self.length.load(Relaxed)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<C, const N: usize, const S: usize> LogQueue<C, N, S> {
    pub(crate) fn with_channel(name: String, channel: C, drop_notices: bool) -> Self {
        Self {
            name,
            channel,
            slots: std::array::from_fn(|_| Slot::new()),
            ring: RingState::new(),
            drops: DropAccounting::new(),
            counters: Counters::default(),
            drop_notices,
        }
    }

    /// Number of slots.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Largest message stored without truncation.
    pub const fn max_message_len(&self) -> usize {
        S - 1
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Occupied slots.
    pub fn len(&self) -> usize {
        self.ring.count.load(Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() >= N
    }

    pub fn free_slots(&self) -> usize {
        N.saturating_sub(self.len())
    }

    /// Store `message` at `tail` and make it visible to the transmitter.
    ///
    /// # Safety
    /// Single producer, and the caller checked that a slot is free. `count`
    /// only ever shrinks behind the producer's back, so that check holds.
    pub(crate) unsafe fn publish(&self, message: &[u8]) -> usize {
        let tail = self.ring.tail.load(Relaxed);
        let slot = &self.slots[tail];
        debug_assert!(!slot.is_in_use(), "producer reached an occupied slot");

        let len = slot.fill(message);
        slot.in_use.store(true, Release);
        self.ring.tail.store(advance(tail, N), Relaxed);
        // SeqCst pairs with the completion handler's release of `busy`: one of
        // the two sides always sees the other and restarts the transmitter.
        self.ring.count.fetch_add(1, SeqCst);
        len
    }

    /// Retire the head slot.
    ///
    /// Only the busy-token holder (the completion handler, or the transmitter
    /// discarding a corrupt slot) calls this.
    pub(crate) fn dequeue(&self) -> Result<(), QueueError> {
        if self.ring.count.load(Acquire) == 0 {
            return Err(QueueError::Empty);
        }

        let head = self.ring.head.load(Relaxed);
        self.slots[head].in_use.store(false, Release);
        self.ring.head.store(advance(head, N), Relaxed);
        self.ring.count.fetch_sub(1, SeqCst);
        Ok(())
    }

    /// Put every index and slot back to the initial state.
    ///
    /// Caller holds the busy token and is the producer, so neither side can
    /// be touching the ring.
    pub(crate) fn clear(&self) {
        for slot in &self.slots {
            slot.in_use.store(false, Relaxed);
            slot.length.store(0, Relaxed);
        }
        self.ring.head.store(0, Relaxed);
        self.ring.tail.store(0, Relaxed);
        self.ring.count.store(0, SeqCst);
        self.drops.clear_pending();
    }

    pub fn state(&self) -> TxState {
        if self.ring.busy.load(Acquire) {
            TxState::Transmitting
        } else {
            TxState::Idle
        }
    }

    pub fn stats(&self) -> QueueStats {
        QueueStats {
            pending: self.ring.count.load(Acquire),
            busy: self.ring.busy.load(Acquire),
            head: self.ring.head.load(Relaxed),
            tail: self.ring.tail.load(Relaxed),
            dropped: self.drops.unreported(),
            pending_drops: self.drops.pending(),
            total_dropped: self.drops.total(),
            notices_injected: self.drops.notices_injected(),
            completions: self.counters.completions.load(Relaxed),
            spurious_completions: self.counters.spurious_completions.load(Relaxed),
            corrupt_discards: self.counters.corrupt_discards.load(Relaxed),
            submit_failures: self.counters.submit_failures.load(Relaxed),
            transmissions: self.counters.transmissions.load(Relaxed),
        }
    }

    /// Drops since start or the previous report; the counter restarts at zero.
    pub fn take_dropped_report(&self) -> u64 {
        self.drops.take_report()
    }

    /// Structural invariants of the ring: `count` in `[0, N]`, indices in
    /// range, `head + count == tail (mod N)` and exactly the occupied slots
    /// marked in use. Only meaningful while both sides are quiescent.
    pub fn check_invariants(&self) -> bool {
        let head = self.ring.head.load(Acquire);
        let tail = self.ring.tail.load(Acquire);
        let count = self.ring.count.load(Acquire);

        if count > N || head >= N || tail >= N {
            return false;
        }
        if (head + count) % N != tail {
            return false;
        }
        if self.is_full() && self.is_empty() {
            return false;
        }
        (0..N).all(|offset| {
            let idx = (head + offset) % N;
            self.slots[idx].is_in_use() == (offset < count)
        })
    }
}
