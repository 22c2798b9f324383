use std::sync::atomic::Ordering::{Acquire, Relaxed, SeqCst};

use log::{trace, warn};

use super::Buffer::LogQueue;
use crate::Core::channel::TxChannel;

impl<C: TxChannel, const N: usize, const S: usize> LogQueue<C, N, S> {
    /// Transfer-complete notification from the channel's interrupt/async
    /// context. The finished transfer is always the head slot.
    ///
    /// Bounded work: retire one slot and try at most one new start. A failed
    /// start (channel not ready, driver refusal) is left for the next enqueue
    /// or [`poll`](Self::poll).
    ///
    /// A notification with no transfer in flight is spurious and changes
    /// nothing but the spurious counter.
    pub fn on_transmission_complete(&self) {
        self.counters.completions.fetch_add(1, Relaxed);

        if !self.ring.busy.load(Acquire) {
            self.counters.spurious_completions.fetch_add(1, Relaxed);
            warn!(target: "uartq::queue", "{}: completion with no transfer in flight", self.name);
            return;
        }

        // Retire before letting go of the token, otherwise a producer could
        // claim it and send the finished slot a second time.
        if self.dequeue().is_err() {
            warn!(target: "uartq::queue", "{}: completion on an empty queue", self.name);
        }
        self.ring.busy.store(false, SeqCst);

        if self.ring.count.load(SeqCst) > 0 {
            if let Err(err) = self.start_transmission() {
                trace!(target: "uartq::queue", "{}: chained start deferred: {}", self.name, err);
            }
        }
    }
}
