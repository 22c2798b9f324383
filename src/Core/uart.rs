// Host-side stand-in for a DMA-driven UART.
//
// `transmit_async` hands the frame to a worker thread and returns at once.
// The worker plays the role of the transfer-complete interrupt: it "shifts
// out" the frame, marks the peripheral ready again and then invokes the
// completion callback, which normally is `LogQueue::on_transmission_complete`.

use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::Mutex;

use super::channel::TxChannel;
use super::futex::{futex_wait, futex_wake};
use crate::error::SubmissionError;

struct UartShared {
    /// Futex word bumped on every submission and on shutdown.
    signal: AtomicU32,
    /// Peripheral idle (the HAL's "ready" state).
    ready: AtomicBool,
    /// Forced not-ready, for exercising the retry paths.
    held: AtomicBool,
    running: AtomicBool,
    pending: Mutex<Option<Vec<u8>>>,
    frames: Mutex<Vec<Vec<u8>>>,
    submitted: AtomicU64,
    echo: bool,
    line_delay: Option<Duration>,
}

/// Simulated serial channel whose completion context is a worker thread.
#[derive(Clone)]
pub struct SimulatedUart {
    shared: Arc<UartShared>,
}

impl Default for SimulatedUart {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedUart {
    pub fn new() -> Self {
        Self::with_options(false, None)
    }

    /// Echo every completed frame to stdout.
    pub fn with_echo(self, echo: bool) -> Self {
        Self::with_options(echo, self.shared.line_delay)
    }

    /// Time one frame occupies the wire.
    pub fn with_line_delay(self, delay: Duration) -> Self {
        Self::with_options(self.shared.echo, Some(delay))
    }

    fn with_options(echo: bool, line_delay: Option<Duration>) -> Self {
        Self {
            shared: Arc::new(UartShared {
                signal: AtomicU32::new(0),
                ready: AtomicBool::new(true),
                held: AtomicBool::new(false),
                running: AtomicBool::new(true),
                pending: Mutex::new(None),
                frames: Mutex::new(Vec::new()),
                submitted: AtomicU64::new(0),
                echo,
                line_delay,
            }),
        }
    }

    /// Force the peripheral to report not-ready (`true`) or release it.
    pub fn hold(&self, held: bool) {
        self.shared.held.store(held, Ordering::Release);
    }

    /// Frames that have fully gone out, in wire order.
    pub fn frames(&self) -> Vec<Vec<u8>> {
        self.shared.frames.lock().clone()
    }

    /// Everything that went out, concatenated.
    pub fn wire_bytes(&self) -> Vec<u8> {
        self.shared.frames.lock().concat()
    }

    pub fn submitted(&self) -> u64 {
        self.shared.submitted.load(Ordering::Relaxed)
    }

    /// Start the completion context. `on_complete` runs once per finished
    /// frame, after the peripheral is ready again.
    pub fn spawn_completion_worker<F>(&self, on_complete: F) -> std::io::Result<JoinHandle<()>>
    where
        F: Fn() + Send + 'static,
    {
        let shared = Arc::clone(&self.shared);
        thread::Builder::new()
            .name("uart-tx-complete".into())
            .spawn(move || loop {
                let seen = shared.signal.load(Ordering::Acquire);

                let frame = shared.pending.lock().take();
                if let Some(frame) = frame {
                    if let Some(delay) = shared.line_delay {
                        thread::sleep(delay);
                    }
                    if shared.echo {
                        let mut out = std::io::stdout().lock();
                        let _ = out.write_all(&frame);
                        let _ = out.flush();
                    }
                    shared.frames.lock().push(frame);
                    shared.ready.store(true, Ordering::Release);
                    on_complete();
                    continue;
                }

                if !shared.running.load(Ordering::Acquire) {
                    break;
                }
                futex_wait(&shared.signal, seen);
            })
    }

    /// Stop the worker once the in-flight frame (if any) has completed.
    pub fn shutdown(&self) {
        self.shared.running.store(false, Ordering::Release);
        self.shared.signal.fetch_add(1, Ordering::Release);
        futex_wake(&self.shared.signal);
    }
}

impl TxChannel for SimulatedUart {
    fn is_ready(&self) -> bool {
        self.shared.ready.load(Ordering::Acquire) && !self.shared.held.load(Ordering::Acquire)
    }

    fn transmit_async(&self, bytes: &[u8]) -> Result<(), SubmissionError> {
        let shared = &self.shared;
        if !shared.running.load(Ordering::Acquire) {
            return Err(SubmissionError::Closed);
        }
        if shared
            .ready
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Relaxed)
            .is_err()
        {
            return Err(SubmissionError::Busy);
        }

        *shared.pending.lock() = Some(bytes.to_vec());
        shared.submitted.fetch_add(1, Ordering::Relaxed);
        shared.signal.fetch_add(1, Ordering::Release);
        futex_wake(&shared.signal);
        Ok(())
    }
}
