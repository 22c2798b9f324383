use std::sync::atomic::Ordering::{Acquire, Relaxed, SeqCst};
use std::sync::Arc;

use log::trace;

use super::drops::DropNotice;
use super::Buffer::{LogQueue, QUEUE_SLOTS, SLOT_BYTES};
use crate::error::QueueError;
use crate::Core::channel::TxChannel;
use crate::Core::text::{floor_char_boundary, until_nul};

/// The producer end of a [`LogQueue`].
///
/// Exactly one exists per queue (see [`QueueBuilder`](super::QueueBuilder)),
/// and enqueueing takes `&mut self`, so producers are serialized by whoever
/// owns this handle. Nothing here blocks.
pub struct Producer<C, const N: usize = QUEUE_SLOTS, const S: usize = SLOT_BYTES> {
    queue: Arc<LogQueue<C, N, S>>,
}

impl<C, const N: usize, const S: usize> Producer<C, N, S> {
    pub(crate) fn new(queue: Arc<LogQueue<C, N, S>>) -> Self {
        Self { queue }
    }

    /// The shared queue, e.g. to hand to the completion context.
    pub fn queue(&self) -> &Arc<LogQueue<C, N, S>> {
        &self.queue
    }

    /// Copies of the queued messages, head first.
    ///
    /// The completion side may retire entries while this runs, but nothing
    /// can overwrite them: only this handle writes slots.
    pub fn queued_messages(&self) -> Vec<Vec<u8>> {
        let q = &*self.queue;
        let head = q.ring.head.load(Acquire);
        let count = q.ring.count.load(Acquire);
        (0..count)
            .map(|offset| {
                let slot = &q.slots[(head + offset) % N];
                // SAFETY: we are the only writer and we are not writing.
                unsafe { slot.bytes(slot.len()).to_vec() }
            })
            .collect()
    }
}

impl<C: TxChannel, const N: usize, const S: usize> Producer<C, N, S> {
    /// Queue a text message and kick the transmitter if it is idle.
    ///
    /// Content ends at the first NUL. Longer text is cut to `S - 1` bytes on
    /// a char boundary. Fails with `InvalidParameter` for an empty message
    /// and with `BufferFull` when no slot is free; the latter is counted and
    /// reported later as a drop notice. A pending notice goes in ahead of
    /// the message, so the message is also refused when the notice takes
    /// the last free slot.
    pub fn enqueue(&mut self, message: &str) -> Result<(), QueueError> {
        let content = until_nul(message.as_bytes()).len();
        // NUL is ASCII, so `content` is a char boundary.
        let cut = floor_char_boundary(&message[..content], S - 1);
        self.enqueue_bytes(&message.as_bytes()[..cut])
    }

    /// Byte-oriented variant of [`enqueue`](Self::enqueue), cut at exactly
    /// `S - 1` bytes.
    pub fn enqueue_bytes(&mut self, message: &[u8]) -> Result<(), QueueError> {
        let message = until_nul(message);
        if message.is_empty() {
            return Err(QueueError::InvalidParameter);
        }

        let q = &*self.queue;
        if q.ring.count.load(Acquire) >= N {
            q.drops.record_drop();
            trace!(target: "uartq::queue", "{}: full, message dropped", q.name);
            return Err(QueueError::BufferFull);
        }

        // The notice is stored first, with the same room check as any
        // message; if it takes the last slot the message itself is dropped
        // and counted toward the next notice.
        let dropped = q.drops.take_pending();
        if dropped > 0 && q.drop_notices {
            let notice = DropNotice::new(dropped);
            // SAFETY: single producer, a free slot was checked above.
            unsafe { q.publish(notice.as_bytes()) };
            q.drops.notice_injected();

            if q.is_full() {
                q.drops.record_drop();
                trace!(
                    target: "uartq::queue",
                    "{}: notice for {} drops took the last slot", q.name, dropped
                );
                Self::kick(q);
                return Err(QueueError::BufferFull);
            }
        }

        // SAFETY: single producer; a slot is still free, and only this
        // handle fills slots.
        unsafe { q.publish(message) };
        Self::kick(q);
        Ok(())
    }

    /// Start a transfer if none is in flight. Failures leave the message
    /// queued for the next enqueue or `poll`.
    fn kick(q: &LogQueue<C, N, S>) {
        if !q.ring.busy.load(SeqCst) {
            match q.start_transmission() {
                Ok(()) | Err(QueueError::Busy) | Err(QueueError::Empty) => {}
                Err(err) => {
                    trace!(target: "uartq::queue", "{}: start deferred: {}", q.name, err);
                }
            }
        }
    }

    /// Return the queue to its freshly created state. Lifetime counters are
    /// kept. Fails with `Busy` while a transfer is in flight.
    pub fn reset(&mut self) -> Result<(), QueueError> {
        let q = &*self.queue;
        if q
            .ring
            .busy
            .compare_exchange(false, true, Acquire, Relaxed)
            .is_err()
        {
            return Err(QueueError::Busy);
        }
        q.clear();
        q.ring.busy.store(false, SeqCst);
        Ok(())
    }
}
