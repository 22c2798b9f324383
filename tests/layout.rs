// Layout conformance tests for the C ABI and the slot/ring memory layout.
// They print the observed values to aid debugging when a mismatch occurs
// on a given platform.
use crossbeam_utils::CachePadded;
use memoffset::offset_of;
use std::mem::{align_of, size_of};
use std::sync::atomic::AtomicUsize;
use uartq::ffi::UartqStats;
use uartq::SPSC::Buffer::layout::RingState;
use uartq::SPSC::Buffer::Slot;

#[test]
fn test_uartq_stats_layout() {
    let size = size_of::<UartqStats>();
    let align = align_of::<UartqStats>();
    let off_pending = offset_of!(UartqStats, pending);
    let off_head = offset_of!(UartqStats, head);
    let off_tail = offset_of!(UartqStats, tail);
    let off_busy = offset_of!(UartqStats, busy);
    let off_dropped = offset_of!(UartqStats, dropped);
    let off_total_dropped = offset_of!(UartqStats, total_dropped);
    let off_submit_failures = offset_of!(UartqStats, submit_failures);

    println!(
        "UartqStats => size: {size}, align: {align}, offsets: [pending:{off_pending}, head:{off_head}, tail:{off_tail}, busy:{off_busy}, dropped:{off_dropped}, total_dropped:{off_total_dropped}, submit_failures:{off_submit_failures}]"
    );

    // 3 x u32 + bool + 3 reserved bytes, then 7 x u64
    assert_eq!(size, 16 + 7 * 8);
    assert_eq!(align, align_of::<u64>());
    assert_eq!(off_pending, 0);
    assert_eq!(off_head, 4);
    assert_eq!(off_tail, 8);
    assert_eq!(off_busy, 12);
    assert_eq!(off_dropped, 16);
    assert_eq!(off_total_dropped, 24);
    assert_eq!(off_submit_failures, 64);
}

#[test]
fn test_slot_is_cache_line_aligned() {
    let size = size_of::<Slot<256>>();
    let align = align_of::<Slot<256>>();
    println!("Slot<256> => size: {size}, align: {align}");

    assert_eq!(align, 64);
    assert_eq!(size % 64, 0);
    assert!(size >= 256 + size_of::<usize>() + 1);
}

#[test]
fn test_ring_cursors_on_separate_cache_lines() {
    let line = align_of::<CachePadded<AtomicUsize>>();
    let off_head = offset_of!(RingState, head);
    let off_tail = offset_of!(RingState, tail);
    let off_count = offset_of!(RingState, count);
    let off_busy = offset_of!(RingState, busy);
    println!("RingState => line: {line}, offsets: [head:{off_head}, tail:{off_tail}, count:{off_count}, busy:{off_busy}]");

    assert_eq!(off_head, 0);
    assert_eq!(off_tail, line);
    assert_eq!(off_count, 2 * line);
    assert_eq!(off_busy, 3 * line);
    assert_eq!(size_of::<RingState>(), 4 * line);
}
