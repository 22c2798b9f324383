use crate::error::{QueueError, SubmissionError};
use crate::Core::channel::TxChannel;
use crate::SPSC::Buffer::{QUEUE_SLOTS, SLOT_BYTES};
use crate::SPSC::{LogQueue, Producer, QueueBuilder, QueueStats};
use parking_lot::Mutex;
use std::ffi::{c_char, c_void, CStr};
use std::ptr;
use std::sync::Arc;

// Error codes
pub const UARTQ_SUCCESS: i32 = 0;
pub const UARTQ_ERROR_NULL_POINTER: i32 = -1;
pub const UARTQ_ERROR_INVALID_PARAM: i32 = -2;
pub const UARTQ_ERROR_BUFFER_FULL: i32 = -3;
pub const UARTQ_ERROR_EMPTY: i32 = -4;
pub const UARTQ_ERROR_BUSY: i32 = -5;
pub const UARTQ_ERROR_NOT_READY: i32 = -6;
pub const UARTQ_ERROR_SUBMISSION: i32 = -7;
pub const UARTQ_ERROR_CORRUPT_SLOT: i32 = -8;
pub const UARTQ_ERROR_INTERNAL: i32 = -9;

/// Peripheral idle check supplied by the C side.
pub type UartqReadyFn = extern "C" fn(ctx: *mut c_void) -> bool;

/// Non-blocking transmit supplied by the C side; 0 means accepted. The
/// buffer stays valid until `uartq_tx_complete` is called for it.
pub type UartqTransmitFn = extern "C" fn(ctx: *mut c_void, data: *const u8, len: usize) -> i32;

/// Channel backed by C callbacks (HAL ready check and DMA start).
pub struct CallbackChannel {
    ready: UartqReadyFn,
    transmit: UartqTransmitFn,
    ctx: *mut c_void,
}

// SAFETY: the C side promises its callbacks and `ctx` are usable from both
// task and interrupt context, which is what the queue needs.
unsafe impl Send for CallbackChannel {}
unsafe impl Sync for CallbackChannel {}

impl TxChannel for CallbackChannel {
    fn is_ready(&self) -> bool {
        (self.ready)(self.ctx)
    }

    fn transmit_async(&self, bytes: &[u8]) -> Result<(), SubmissionError> {
        match (self.transmit)(self.ctx, bytes.as_ptr(), bytes.len()) {
            0 => Ok(()),
            status => Err(SubmissionError::Rejected(status)),
        }
    }
}

/// Handle to a queue instance (opaque pointer)
pub struct QueueHandle {
    producer: Mutex<Producer<CallbackChannel>>,
    queue: Arc<LogQueue<CallbackChannel>>,
}

/// Diagnostics snapshot with a fixed C layout.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default)]
pub struct UartqStats {
    pub pending: u32,
    pub head: u32,
    pub tail: u32,
    pub busy: bool,
    pub _reserved: [u8; 3],
    pub dropped: u64,
    pub total_dropped: u64,
    pub notices_injected: u64,
    pub completions: u64,
    pub spurious_completions: u64,
    pub corrupt_discards: u64,
    pub submit_failures: u64,
}

impl From<QueueStats> for UartqStats {
    fn from(stats: QueueStats) -> Self {
        Self {
            pending: stats.pending as u32,
            head: stats.head as u32,
            tail: stats.tail as u32,
            busy: stats.busy,
            _reserved: [0; 3],
            dropped: stats.dropped,
            total_dropped: stats.total_dropped,
            notices_injected: stats.notices_injected,
            completions: stats.completions,
            spurious_completions: stats.spurious_completions,
            corrupt_discards: stats.corrupt_discards,
            submit_failures: stats.submit_failures,
        }
    }
}

fn error_code(err: QueueError) -> i32 {
    match err {
        QueueError::InvalidParameter => UARTQ_ERROR_INVALID_PARAM,
        QueueError::BufferFull => UARTQ_ERROR_BUFFER_FULL,
        QueueError::Empty => UARTQ_ERROR_EMPTY,
        QueueError::Busy => UARTQ_ERROR_BUSY,
        QueueError::ChannelNotReady => UARTQ_ERROR_NOT_READY,
        QueueError::Submission(_) => UARTQ_ERROR_SUBMISSION,
        QueueError::CorruptSlot { .. } => UARTQ_ERROR_CORRUPT_SLOT,
        QueueError::InvalidConfig(_) => UARTQ_ERROR_INTERNAL,
    }
}

// -----------------------------------------------------------------------------
// Lifecycle
// -----------------------------------------------------------------------------

/// Create a queue (32 slots of 256 bytes) over the given channel callbacks.
///
/// # Returns
/// * Pointer to `QueueHandle`, or NULL if a callback is missing.
#[no_mangle]
pub extern "C" fn uartq_new(
    ready: Option<UartqReadyFn>,
    transmit: Option<UartqTransmitFn>,
    ctx: *mut c_void,
) -> *mut QueueHandle {
    let (Some(ready), Some(transmit)) = (ready, transmit) else {
        return ptr::null_mut();
    };
    let channel = CallbackChannel {
        ready,
        transmit,
        ctx,
    };

    match QueueBuilder::new().with_name("ffi").build::<_, QUEUE_SLOTS, SLOT_BYTES>(channel) {
        Ok((producer, queue)) => Box::into_raw(Box::new(QueueHandle {
            producer: Mutex::new(producer),
            queue,
        })),
        Err(e) => {
            log::error!(target: "uartq::ffi", "failed to build queue: {}", e);
            ptr::null_mut()
        }
    }
}

/// Reset the queue to its initial state. Fails with `UARTQ_ERROR_BUSY`
/// while a transfer is in flight.
#[no_mangle]
pub extern "C" fn uartq_reset(handle: *mut QueueHandle) -> i32 {
    if handle.is_null() {
        return UARTQ_ERROR_NULL_POINTER;
    }
    let handle = unsafe { &*handle };
    let Some(mut producer) = handle.producer.try_lock() else {
        return UARTQ_ERROR_BUSY;
    };
    match producer.reset() {
        Ok(()) => UARTQ_SUCCESS,
        Err(e) => error_code(e),
    }
}

/// Free a queue handle. No transfer may be in flight.
#[no_mangle]
pub extern "C" fn uartq_free(handle: *mut QueueHandle) {
    if !handle.is_null() {
        unsafe {
            let _ = Box::from_raw(handle); // Dropped automatically
        }
    }
}

// -----------------------------------------------------------------------------
// Producer API
// -----------------------------------------------------------------------------

/// Queue a NUL-terminated message.
///
/// # Returns
/// * 0 on success.
/// * `UARTQ_ERROR_INVALID_PARAM` for NULL or empty text.
/// * `UARTQ_ERROR_BUFFER_FULL` when the message was dropped.
/// * `UARTQ_ERROR_BUSY` when another producer is inside the queue right now;
///   the call does not wait.
#[no_mangle]
pub extern "C" fn uartq_output(handle: *mut QueueHandle, message: *const c_char) -> i32 {
    if handle.is_null() {
        return UARTQ_ERROR_NULL_POINTER;
    }
    if message.is_null() {
        return UARTQ_ERROR_INVALID_PARAM;
    }

    let handle = unsafe { &*handle };
    let bytes = unsafe { CStr::from_ptr(message) }.to_bytes();
    let Some(mut producer) = handle.producer.try_lock() else {
        return UARTQ_ERROR_BUSY;
    };
    match producer.enqueue_bytes(bytes) {
        Ok(()) => UARTQ_SUCCESS,
        Err(e) => error_code(e),
    }
}

// -----------------------------------------------------------------------------
// Completion side
// -----------------------------------------------------------------------------

/// Transfer-complete notification; call from the UART TX-complete interrupt.
#[no_mangle]
pub extern "C" fn uartq_tx_complete(handle: *mut QueueHandle) {
    if !handle.is_null() {
        let handle = unsafe { &*handle };
        handle.queue.on_transmission_complete();
    }
}

/// Restart an idle queue that still holds messages.
///
/// # Returns
/// * 1 if a transfer was started, 0 if there was nothing to do, negative on error.
#[no_mangle]
pub extern "C" fn uartq_poll(handle: *mut QueueHandle) -> i32 {
    if handle.is_null() {
        return UARTQ_ERROR_NULL_POINTER;
    }
    let handle = unsafe { &*handle };
    match handle.queue.poll() {
        Ok(started) => started as i32,
        Err(e) => error_code(e),
    }
}

// -----------------------------------------------------------------------------
// Diagnostics
// -----------------------------------------------------------------------------

/// Callback count, queued message count and busy flag. Any out pointer may
/// be NULL.
#[no_mangle]
pub extern "C" fn uartq_get_debug_info(
    handle: *mut QueueHandle,
    callback_count: *mut u32,
    queue_count: *mut u8,
    busy: *mut bool,
) -> i32 {
    if handle.is_null() {
        return UARTQ_ERROR_NULL_POINTER;
    }
    let stats = unsafe { &*handle }.queue.stats();
    unsafe {
        if !callback_count.is_null() {
            *callback_count = stats.completions as u32;
        }
        if !queue_count.is_null() {
            *queue_count = stats.pending.min(u8::MAX as usize) as u8;
        }
        if !busy.is_null() {
            *busy = stats.busy;
        }
    }
    UARTQ_SUCCESS
}

/// Fill `out` with a diagnostics snapshot.
#[no_mangle]
pub extern "C" fn uartq_stats(handle: *mut QueueHandle, out: *mut UartqStats) -> i32 {
    if handle.is_null() || out.is_null() {
        return UARTQ_ERROR_NULL_POINTER;
    }
    let stats = unsafe { &*handle }.queue.stats();
    unsafe {
        ptr::write(out, UartqStats::from(stats));
    }
    UARTQ_SUCCESS
}

/// Return the dropped-message count since start or the previous call, and
/// restart it at zero.
#[no_mangle]
pub extern "C" fn uartq_take_dropped(handle: *mut QueueHandle) -> u64 {
    if handle.is_null() {
        return 0;
    }
    unsafe { &*handle }.queue.take_dropped_report()
}
