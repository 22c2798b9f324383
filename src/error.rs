use thiserror::Error;

/// Failure reported by a channel driver when it refuses a transmit request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmissionError {
    /// The peripheral already has a transfer in flight.
    #[error("channel already has a transfer in flight")]
    Busy,
    /// The channel has been shut down.
    #[error("channel is closed")]
    Closed,
    /// Driver-specific status code.
    #[error("transfer rejected by driver (status {0})")]
    Rejected(i32),
}

/// Errors produced by the transport queue.
///
/// None of these are fatal. `BufferFull` is the expected overflow path,
/// `ChannelNotReady` and `Submission` leave the message queued for the next
/// trigger, and `CorruptSlot` means the slot was discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("message is empty")]
    InvalidParameter,
    #[error("queue is full, message dropped")]
    BufferFull,
    #[error("queue is empty")]
    Empty,
    #[error("a transmission is already in flight")]
    Busy,
    #[error("channel is not ready")]
    ChannelNotReady,
    #[error("submission failed: {0}")]
    Submission(#[from] SubmissionError),
    #[error("slot {index} holds an invalid length {length}, discarded")]
    CorruptSlot { index: usize, length: usize },
    #[error("invalid queue configuration: {0}")]
    InvalidConfig(&'static str),
}

impl QueueError {
    /// Transient conditions keep the message queued; it goes out on a later
    /// enqueue, completion or poll.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            QueueError::Busy | QueueError::ChannelNotReady | QueueError::Submission(_)
        )
    }
}
