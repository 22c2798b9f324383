// Drop accounting. Messages rejected by a full queue are counted here and
// later reported in-band as a single synthetic "Dropped messages" line placed
// ahead of the next message that does get in.

use std::fmt::Write;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering::{AcqRel, Relaxed};

use crate::Core::text::SliceWriter;

/// Room for the notice text; `u64::MAX` plus the prefix fits well inside.
pub const DROP_NOTICE_BYTES: usize = 64;

pub struct DropAccounting {
    /// Drops not yet flushed into a notice.
    pending: AtomicU64,
    /// Drops since start or since the last `take_report`.
    unreported: AtomicU64,
    total: AtomicU64,
    notices_injected: AtomicU64,
}

impl DropAccounting {
    pub const fn new() -> Self {
        Self {
            pending: AtomicU64::new(0),
            unreported: AtomicU64::new(0),
            total: AtomicU64::new(0),
            notices_injected: AtomicU64::new(0),
        }
    }

    /// Count one rejected message.
    pub fn record_drop(&self) {
        self.pending.fetch_add(1, AcqRel);
        self.unreported.fetch_add(1, Relaxed);
        self.total.fetch_add(1, Relaxed);
    }

    /// Take the pending count, leaving zero behind.
    pub fn take_pending(&self) -> u64 {
        self.pending.swap(0, AcqRel)
    }

    pub fn notice_injected(&self) {
        self.notices_injected.fetch_add(1, Relaxed);
    }

    pub fn take_report(&self) -> u64 {
        self.unreported.swap(0, AcqRel)
    }

    pub(crate) fn clear_pending(&self) {
        self.pending.store(0, Relaxed);
    }

    pub fn pending(&self) -> u64 {
        self.pending.load(Relaxed)
    }

    pub fn unreported(&self) -> u64 {
        self.unreported.load(Relaxed)
    }

    pub fn total(&self) -> u64 {
        self.total.load(Relaxed)
    }

    pub fn notices_injected(&self) -> u64 {
        self.notices_injected.load(Relaxed)
    }
}

impl Default for DropAccounting {
    fn default() -> Self {
        Self::new()
    }
}

/// Notice text for `dropped` lost messages, formatted on the stack.
pub struct DropNotice {
    buf: [u8; DROP_NOTICE_BYTES],
    len: usize,
}

impl DropNotice {
    pub fn new(dropped: u64) -> Self {
        let mut buf = [0u8; DROP_NOTICE_BYTES];
        let len = {
            let mut w = SliceWriter::new(&mut buf);
            let _ = write!(w, "Dropped messages: {dropped}\r\n");
            w.len()
        };
        Self { buf, len }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notice_text() {
        assert_eq!(DropNotice::new(1).as_bytes(), b"Dropped messages: 1\r\n");
        assert_eq!(
            DropNotice::new(u64::MAX).as_bytes(),
            b"Dropped messages: 18446744073709551615\r\n"
        );
    }

    #[test]
    fn pending_resets_on_take_but_totals_do_not() {
        let drops = DropAccounting::new();
        drops.record_drop();
        drops.record_drop();
        assert_eq!(drops.take_pending(), 2);
        assert_eq!(drops.take_pending(), 0);
        assert_eq!(drops.total(), 2);
        assert_eq!(drops.take_report(), 2);
        assert_eq!(drops.unreported(), 0);
        assert_eq!(drops.total(), 2);
    }
}
