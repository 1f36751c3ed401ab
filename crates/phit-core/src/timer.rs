//! Monotonic nanosecond timer.
//!
//! Every phase measurement in this crate runs against this one clock. It must
//! be monotonic (non-decreasing within a process) and cheap to read; the
//! absolute epoch is irrelevant because consumers only look at deltas and low
//! bits.

/// Monotonic timestamp in nanoseconds.
///
/// On macOS this reads the system absolute time counter directly via
/// `mach_absolute_time()`. On Linux it reads `CLOCK_MONOTONIC_RAW`, which is
/// not subject to NTP slewing. Elsewhere it falls back to
/// `std::time::Instant` against a process-local epoch.
#[cfg(target_os = "macos")]
pub fn now_ns() -> u64 {
    unsafe extern "C" {
        fn mach_absolute_time() -> u64;
    }
    // SAFETY: mach_absolute_time() is a stable macOS API that returns the
    // current value of the system absolute time counter. Always safe to call.
    unsafe { mach_absolute_time() }
}

#[cfg(target_os = "linux")]
pub fn now_ns() -> u64 {
    let mut ts = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    // SAFETY: clock_gettime writes into the timespec we own; MONOTONIC_RAW
    // is a valid clock id on Linux.
    unsafe {
        libc::clock_gettime(libc::CLOCK_MONOTONIC_RAW, &mut ts);
    }
    ts.tv_sec as u64 * 1_000_000_000 + ts.tv_nsec as u64
}

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
pub fn now_ns() -> u64 {
    use std::sync::OnceLock;
    use std::time::Instant;
    static EPOCH: OnceLock<Instant> = OnceLock::new();
    let epoch = EPOCH.get_or_init(Instant::now);
    epoch.elapsed().as_nanos() as u64
}
