use crate::error::SubmissionError;

/// Non-blocking transmit primitives of a serial channel driver.
///
/// The queue calls these from both the producer context and the completion
/// context, so implementations must not block.
///
/// After `transmit_async` returns `Ok`, the driver owns the transfer until it
/// reports completion through [`LogQueue::on_transmission_complete`]. The
/// slice stays valid and unmodified for that whole window: the slot it points
/// into is not recycled until the completion arrives.
///
/// [`LogQueue::on_transmission_complete`]: crate::SPSC::LogQueue::on_transmission_complete
pub trait TxChannel: Send + Sync {
    /// The peripheral is idle and can accept a new transfer.
    fn is_ready(&self) -> bool;

    /// Start sending `bytes`. Must return immediately.
    fn transmit_async(&self, bytes: &[u8]) -> Result<(), SubmissionError>;
}

impl<T: TxChannel + ?Sized> TxChannel for &T {
    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }

    fn transmit_async(&self, bytes: &[u8]) -> Result<(), SubmissionError> {
        (**self).transmit_async(bytes)
    }
}

impl<T: TxChannel + ?Sized> TxChannel for std::sync::Arc<T> {
    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }

    fn transmit_async(&self, bytes: &[u8]) -> Result<(), SubmissionError> {
        (**self).transmit_async(bytes)
    }
}
