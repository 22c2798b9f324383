use std::sync::Arc;

use super::Buffer::LogQueue;
use super::Producer;
use crate::error::QueueError;

pub struct QueueBuilder {
    name: String,
    drop_notices: bool,
}

impl Default for QueueBuilder {
    fn default() -> Self {
        Self {
            name: "uart".to_string(),
            drop_notices: true,
        }
    }
}

impl QueueBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Label used in the queue's own diagnostics.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Inject "Dropped messages" notices after overflow (default on).
    pub fn with_drop_notices(mut self, enabled: bool) -> Self {
        self.drop_notices = enabled;
        self
    }

    /// Create the queue over `channel` and its single producer.
    pub fn build<C, const N: usize, const S: usize>(
        self,
        channel: C,
    ) -> Result<(Producer<C, N, S>, Arc<LogQueue<C, N, S>>), QueueError> {
        if N == 0 {
            return Err(QueueError::InvalidConfig("queue needs at least one slot"));
        }
        if S < 2 {
            return Err(QueueError::InvalidConfig(
                "slot needs room for one byte and the terminator",
            ));
        }
        if S > u16::MAX as usize {
            return Err(QueueError::InvalidConfig("slot larger than 65535 bytes"));
        }

        let queue = Arc::new(LogQueue::with_channel(self.name, channel, self.drop_notices));
        Ok((Producer::new(Arc::clone(&queue)), queue))
    }
}
