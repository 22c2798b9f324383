//! Bounded transport queue for log lines over a serial link.
//!
//! A single producer copies text into fixed slots; the channel drains them
//! one non-blocking transfer at a time, and each transfer-complete
//! notification retires the head slot and chains the next. Overflow drops
//! the new message and is reported later as an in-band notice.

pub mod error;
pub mod ffi;
pub mod logger;

// Module naming follows project convention (SPSC = Single-Producer Single-Consumer)
#[allow(non_snake_case)]
pub mod SPSC;

#[allow(non_snake_case)]
pub mod Core;

#[allow(non_snake_case)]
pub mod Debug {
    pub mod StructDebug;
}

pub use error::{QueueError, SubmissionError};
pub use logger::{ModuleLevels, QueueLogger};
pub use Core::{SimulatedUart, TxChannel};
pub use SPSC::{LogQueue, Producer, QueueBuilder, QueueStats, TxState};
