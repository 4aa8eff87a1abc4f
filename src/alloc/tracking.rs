//! Allocation statistics - process-wide counters behind a toggle
//!
//! Counters are relaxed atomics; they are a monitoring aid, not a
//! synchronization mechanism. Enabling resets everything and starts
//! counting, disabling stops counting but keeps the numbers readable.

use crate::logging::info;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

static TRACKING: Lazy<TrackingState> = Lazy::new(TrackingState::new);

struct TrackingState {
    enabled: AtomicBool,
    // Serializes enable/disable so a reset cannot interleave with a toggle
    toggle: Mutex<()>,
    total_allocated: AtomicUsize,
    current_allocated: AtomicUsize,
    peak_allocated: AtomicUsize,
    allocation_count: AtomicUsize,
    free_count: AtomicUsize,
}

impl TrackingState {
    fn new() -> Self {
        Self {
            enabled: AtomicBool::new(false),
            toggle: Mutex::new(()),
            total_allocated: AtomicUsize::new(0),
            current_allocated: AtomicUsize::new(0),
            peak_allocated: AtomicUsize::new(0),
            allocation_count: AtomicUsize::new(0),
            free_count: AtomicUsize::new(0),
        }
    }

    fn reset(&self) {
        self.total_allocated.store(0, Ordering::Relaxed);
        self.current_allocated.store(0, Ordering::Relaxed);
        self.peak_allocated.store(0, Ordering::Relaxed);
        self.allocation_count.store(0, Ordering::Relaxed);
        self.free_count.store(0, Ordering::Relaxed);
    }
}

/// Statistics snapshot
///
/// `total_freed` is carried for layout parity with the report format but
/// is never updated: the release path does not account bytes (see
/// [`super::release`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemoryStats {
    pub total_allocated: usize,
    pub total_freed: usize,
    pub current_allocated: usize,
    pub peak_allocated: usize,
    pub allocation_count: usize,
    pub free_count: usize,
}

/// Enable tracking, resetting all counters
pub fn enable() {
    let state = &*TRACKING;
    let _toggle = state.toggle.lock();
    state.reset();
    state.enabled.store(true, Ordering::Relaxed);
}

/// Disable tracking; counters keep their last values
pub fn disable() {
    let state = &*TRACKING;
    let _toggle = state.toggle.lock();
    state.enabled.store(false, Ordering::Relaxed);
}

/// True while tracking is enabled
pub fn is_enabled() -> bool {
    TRACKING.enabled.load(Ordering::Relaxed)
}

/// Read the counters
pub fn stats() -> MemoryStats {
    let state = &*TRACKING;
    MemoryStats {
        total_allocated: state.total_allocated.load(Ordering::Relaxed),
        total_freed: 0,
        current_allocated: state.current_allocated.load(Ordering::Relaxed),
        peak_allocated: state.peak_allocated.load(Ordering::Relaxed),
        allocation_count: state.allocation_count.load(Ordering::Relaxed),
        free_count: state.free_count.load(Ordering::Relaxed),
    }
}

/// Emit the counters as a structured log event
pub fn log_stats() {
    let snapshot = stats();
    info!(
        event = "memory_stats",
        total_allocated = snapshot.total_allocated,
        total_freed = snapshot.total_freed,
        current_allocated = snapshot.current_allocated,
        peak_allocated = snapshot.peak_allocated,
        allocation_count = snapshot.allocation_count,
        free_count = snapshot.free_count,
        "Memory statistics"
    );
}

/// True if anything counted as allocated has not been matched by a free
///
/// Because freed bytes are not subtracted, this is an over-approximation:
/// it reports the bytes allocated since tracking was enabled.
pub fn has_leaks() -> bool {
    TRACKING.current_allocated.load(Ordering::Relaxed) > 0
}

/// Count a fresh allocation of `bytes`
pub(crate) fn record_alloc(bytes: usize) {
    let state = &*TRACKING;
    if !state.enabled.load(Ordering::Relaxed) {
        return;
    }

    state.total_allocated.fetch_add(bytes, Ordering::Relaxed);
    let current = state.current_allocated.fetch_add(bytes, Ordering::Relaxed) + bytes;
    state.allocation_count.fetch_add(1, Ordering::Relaxed);
    state.peak_allocated.fetch_max(current, Ordering::Relaxed);
}

/// Count a realloc that grew from an empty slot
///
/// The peak watermark is not advanced on this path, matching the
/// original accounting exactly.
pub(crate) fn record_realloc_fresh(bytes: usize) {
    let state = &*TRACKING;
    if !state.enabled.load(Ordering::Relaxed) {
        return;
    }

    state.total_allocated.fetch_add(bytes, Ordering::Relaxed);
    state.current_allocated.fetch_add(bytes, Ordering::Relaxed);
    state.allocation_count.fetch_add(1, Ordering::Relaxed);
}

/// Count a release (bytes are not consulted on this path)
pub(crate) fn record_free() {
    let state = &*TRACKING;
    if !state.enabled.load(Ordering::Relaxed) {
        return;
    }

    state.free_count.fetch_add(1, Ordering::Relaxed);
}
