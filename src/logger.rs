// `log` front-end that formats records into a stack buffer and hands them to
// the queue's producer. Levels are filtered per module, like the firmware's
// per-module trace level table.

use std::fmt::Write;
use std::sync::Arc;
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};
use parking_lot::Mutex;

use crate::error::QueueError;
use crate::Core::channel::TxChannel;
use crate::Core::text::SliceWriter;
use crate::SPSC::Buffer::{QUEUE_SLOTS, SLOT_BYTES};
use crate::SPSC::{LogQueue, Producer};

/// Targets the queue reports its own diagnostics under. Never fed back in.
const SELF_TARGET: &str = "uartq";

/// Per-module level table: a default plus overrides keyed by target prefix.
/// The longest matching prefix wins; a prefix matches the target itself and
/// anything below it (`motor` matches `motor` and `motor::spi`).
#[derive(Clone, Debug)]
pub struct ModuleLevels {
    default: LevelFilter,
    overrides: Vec<(String, LevelFilter)>,
}

impl Default for ModuleLevels {
    fn default() -> Self {
        Self::new(LevelFilter::Warn)
    }
}

impl ModuleLevels {
    pub fn new(default: LevelFilter) -> Self {
        Self {
            default,
            overrides: Vec::new(),
        }
    }

    pub fn with_module(mut self, prefix: impl Into<String>, level: LevelFilter) -> Self {
        let prefix = prefix.into();
        self.overrides.retain(|(p, _)| *p != prefix);
        self.overrides.push((prefix, level));
        self
    }

    pub fn level_for(&self, target: &str) -> LevelFilter {
        self.overrides
            .iter()
            .filter(|(prefix, _)| module_matches(prefix, target))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, level)| *level)
            .unwrap_or(self.default)
    }

    /// Most verbose level any module allows.
    pub fn max_level(&self) -> LevelFilter {
        self.overrides
            .iter()
            .map(|(_, level)| *level)
            .fold(self.default, Ord::max)
    }
}

fn module_matches(prefix: &str, target: &str) -> bool {
    match target.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with("::"),
        None => false,
    }
}

/// `log::Log` implementation writing one line per record into a queue.
///
/// Callers on different threads are serialized on the producer; the
/// completion side and `flush` never take that lock.
pub struct QueueLogger<C, const N: usize = QUEUE_SLOTS, const S: usize = SLOT_BYTES> {
    producer: Mutex<Producer<C, N, S>>,
    queue: Arc<LogQueue<C, N, S>>,
    levels: ModuleLevels,
    started: Instant,
}

impl<C: TxChannel, const N: usize, const S: usize> QueueLogger<C, N, S> {
    pub fn new(producer: Producer<C, N, S>, levels: ModuleLevels) -> Self {
        Self {
            queue: Arc::clone(producer.queue()),
            producer: Mutex::new(producer),
            levels,
            started: Instant::now(),
        }
    }

    pub fn levels(&self) -> &ModuleLevels {
        &self.levels
    }

    /// Format and queue one record. Overflow surfaces as `BufferFull` and
    /// is already counted for the next drop notice.
    pub fn write_record(&self, record: &Record<'_>) -> Result<(), QueueError> {
        const EOL: &[u8] = b"\r\n";
        let mut buf = [0u8; S];
        let limit = S - 1;
        // The body is cut on a char boundary short of the line ending, so a
        // long record still ends the terminal line.
        let body = {
            let mut w = SliceWriter::new(&mut buf[..limit.saturating_sub(EOL.len())]);
            let _ = write!(
                w,
                "[{:>8}] {:<5} {}: {}",
                self.started.elapsed().as_millis(),
                record.level(),
                record.target(),
                record.args()
            );
            w.len()
        };
        let len = (body + EOL.len()).min(limit);
        buf[body..len].copy_from_slice(&EOL[..len - body]);
        self.producer.lock().enqueue_bytes(&buf[..len])
    }

    /// Install as the process logger. The logger lives for the rest of the
    /// process, like the queue it feeds.
    pub fn install(self) -> Result<&'static Self, SetLoggerError>
    where
        C: 'static,
    {
        let max = self.levels.max_level();
        let logger: &'static Self = Box::leak(Box::new(self));
        log::set_logger(logger)?;
        log::set_max_level(max);
        Ok(logger)
    }
}

impl<C: TxChannel, const N: usize, const S: usize> Log for QueueLogger<C, N, S> {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        let target = metadata.target();
        if module_matches(SELF_TARGET, target) {
            return false;
        }
        metadata.level() <= self.levels.level_for(target)
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            let _ = self.write_record(record);
        }
    }

    fn flush(&self) {
        // Nothing to wait for without blocking; just nudge an idle queue.
        let _ = self.queue.poll();
    }
}
