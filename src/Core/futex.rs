use std::sync::atomic::AtomicU32;

/// Park the calling thread while `atomic` still holds `expected`.
///
/// Spurious returns are possible; callers re-check their condition.
#[cfg(target_os = "linux")]
pub fn futex_wait(atomic: &AtomicU32, expected: u32) {
    use std::ptr;
    use std::sync::atomic::Ordering;

    if atomic.load(Ordering::Acquire) != expected {
        return;
    }

    unsafe {
        libc::syscall(
            libc::SYS_futex,
            atomic as *const AtomicU32 as *const u32,
            libc::FUTEX_WAIT | libc::FUTEX_PRIVATE_FLAG,
            expected,
            ptr::null::<libc::timespec>(),
            ptr::null::<u32>(),
            0u32,
        );
    }
}

/// Wake every thread parked on `atomic`.
///
/// `SimulatedUart` lets more than one completion worker park on the same
/// signal word, and `shutdown` has to reach all of them.
#[cfg(target_os = "linux")]
pub fn futex_wake(atomic: &AtomicU32) {
    unsafe {
        libc::syscall(
            libc::SYS_futex,
            atomic as *const AtomicU32 as *const u32,
            libc::FUTEX_WAKE | libc::FUTEX_PRIVATE_FLAG,
            i32::MAX,
            std::ptr::null::<libc::timespec>(),
            std::ptr::null::<u32>(),
            0u32,
        );
    }
}

#[cfg(not(target_os = "linux"))]
pub fn futex_wait(_atomic: &AtomicU32, _expected: u32) {
    // Fallback for non-Linux: yield and let the caller re-check
    std::thread::yield_now();
}

#[cfg(not(target_os = "linux"))]
pub fn futex_wake(_atomic: &AtomicU32) {
    // No-op on non-Linux
}
