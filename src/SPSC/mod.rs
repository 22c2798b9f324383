mod builder;
mod completion;
pub mod drops;
mod producer;
mod transmitter;

pub use builder::QueueBuilder;
pub use producer::Producer;

#[allow(non_snake_case)]
pub mod Buffer {
    #[allow(clippy::module_inception)]
    pub mod Buffer;
    pub mod Buffer_impl;
    pub mod layout;
    pub use Buffer::{LogQueue, Slot, QUEUE_SLOTS, SLOT_BYTES}; // re-export for stable path
}

#[allow(non_snake_case)]
pub mod Structs {
    pub mod Buffer_Structs;
    pub use Buffer_Structs::{QueueStats, TxState}; // re-export for stable path
}

pub use Buffer::LogQueue;
pub use Structs::{QueueStats, TxState};
