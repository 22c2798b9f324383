// Read-only views of a queue, for diagnostics and the C ABI.

/// Transmitter state of a queue.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TxState {
    /// No transfer in flight; messages may still be pending.
    Idle,
    /// A transfer of the head slot is in flight.
    Transmitting,
}

/// Point-in-time diagnostics of one queue.
///
/// Fields are loaded one by one, so a snapshot taken while traffic flows is
/// not a single atomic cut.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct QueueStats {
    /// Occupied slots.
    pub pending: usize,
    pub busy: bool,
    pub head: usize,
    pub tail: usize,
    /// Messages dropped since start or the last `take_dropped_report`.
    pub dropped: u64,
    /// Drops not yet flushed into a notice.
    pub pending_drops: u64,
    pub total_dropped: u64,
    pub notices_injected: u64,
    /// Completion callbacks received, spurious ones included.
    pub completions: u64,
    pub spurious_completions: u64,
    pub corrupt_discards: u64,
    pub submit_failures: u64,
    pub transmissions: u64,
}

impl QueueStats {
    pub fn state(&self) -> TxState {
        if self.busy {
            TxState::Transmitting
        } else {
            TxState::Idle
        }
    }

    /// Idle with nothing queued.
    pub fn is_quiescent(&self) -> bool {
        !self.busy && self.pending == 0
    }
}
