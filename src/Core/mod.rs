pub mod channel;
pub mod futex;
pub mod text;
pub mod uart;

pub use channel::TxChannel;
pub use uart::SimulatedUart;
