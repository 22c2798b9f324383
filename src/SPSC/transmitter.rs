use std::sync::atomic::Ordering::{Acquire, Relaxed, Release};

use log::{debug, error, trace, warn};

use super::Buffer::LogQueue;
use crate::error::QueueError;
use crate::Core::channel::TxChannel;

impl<C: TxChannel, const N: usize, const S: usize> LogQueue<C, N, S> {
    /// Start sending the head slot if the channel is free.
    ///
    /// Safe to call from either context: the `busy` flag is claimed with a
    /// compare-exchange, and the caller that wins is the only one allowed to
    /// read or retire the head slot until it lets go.
    ///
    /// Errors, in the order checked:
    /// - `Empty`: nothing queued.
    /// - `Busy`: a transfer is already in flight.
    /// - `ChannelNotReady`: the peripheral is not idle. Transient.
    /// - `CorruptSlot`: the head slot's length is outside `(0, S]`. The slot
    ///   is retired without being sent.
    /// - `Submission`: the driver refused the transfer. The message stays
    ///   queued for the next trigger.
    pub fn start_transmission(&self) -> Result<(), QueueError> {
        if self.ring.count.load(Acquire) == 0 {
            return Err(QueueError::Empty);
        }
        if self
            .ring
            .busy
            .compare_exchange(false, true, Acquire, Relaxed)
            .is_err()
        {
            return Err(QueueError::Busy);
        }

        if !self.channel.is_ready() {
            self.ring.busy.store(false, Release);
            trace!(target: "uartq::queue", "{}: channel not ready", self.name);
            return Err(QueueError::ChannelNotReady);
        }

        let head = self.ring.head.load(Relaxed);
        let slot = &self.slots[head];
        let length = slot.length.load(Relaxed);

        if length == 0 || length > S || !slot.is_in_use() {
            // Discarded rather than sent: a bad slot means a producer/consumer
            // bug, and its bytes are not log content.
            let _ = self.dequeue();
            self.ring.busy.store(false, Release);
            self.counters.corrupt_discards.fetch_add(1, Relaxed);
            error!(
                target: "uartq::queue",
                "{}: discarding corrupt slot {} (length {})", self.name, head, length
            );
            return Err(QueueError::CorruptSlot {
                index: head,
                length,
            });
        }

        // SAFETY: we hold the busy token and the slot is at head with count > 0.
        let bytes = unsafe { slot.bytes(length) };
        match self.channel.transmit_async(bytes) {
            Ok(()) => {
                self.counters.transmissions.fetch_add(1, Relaxed);
                Ok(())
            }
            Err(err) => {
                self.ring.busy.store(false, Release);
                self.counters.submit_failures.fetch_add(1, Relaxed);
                warn!(
                    target: "uartq::queue",
                    "{}: transmit of slot {} rejected: {}", self.name, head, err
                );
                Err(QueueError::Submission(err))
            }
        }
    }

    /// External trigger for a queue left idle with messages pending, for
    /// example after a not-ready channel. Call it from a periodic task.
    ///
    /// Returns `Ok(true)` when a transfer was started, `Ok(false)` when there
    /// was nothing to do.
    pub fn poll(&self) -> Result<bool, QueueError> {
        match self.start_transmission() {
            Ok(()) => Ok(true),
            Err(QueueError::Empty) | Err(QueueError::Busy) => Ok(false),
            Err(err) => {
                debug!(target: "uartq::queue", "{}: poll could not start: {}", self.name, err);
                Err(err)
            }
        }
    }
}
