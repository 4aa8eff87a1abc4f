//! Tracked allocation - C API over the checked block allocator
//!
//! The release entry points take the address of the caller's pointer
//! and zero it, so generated code cannot double-free through a stale
//! variable.

use crate::alloc;
use crate::error::RuntimeError;
use std::ptr::{self, NonNull};

/// Allocate `size` bytes; null on failure (see the last-error slot)
#[no_mangle]
pub extern "C" fn pyrite_alloc(size: usize) -> *mut u8 {
    match alloc::alloc(size) {
        Ok(block) => block.as_ptr(),
        Err(_) => ptr::null_mut(),
    }
}

/// Allocate a zeroed array of `count` elements of `elem_size` bytes
#[no_mangle]
pub extern "C" fn pyrite_alloc_zeroed(count: usize, elem_size: usize) -> *mut u8 {
    match alloc::alloc_zeroed(count, elem_size) {
        Ok(block) => block.as_ptr(),
        Err(_) => ptr::null_mut(),
    }
}

/// Resize the block pointed at by `*slot` to `new_size` bytes
///
/// `new_size == 0` frees the block and nulls `*slot` (success). On
/// failure `*slot` and its block are untouched.
///
/// # Safety
/// - Null-safe in `slot` itself (rejected as an invalid argument)
/// - `*slot` must be null or a live block from this allocator
#[no_mangle]
pub unsafe extern "C" fn pyrite_realloc(slot: *mut *mut u8, new_size: usize) -> i32 {
    let Some(slot) = slot.as_mut() else {
        return RuntimeError::invalid_argument("realloc slot is null".to_string())
            .kind
            .code();
    };

    let mut block = NonNull::new(*slot);
    let status = super::status_of(alloc::realloc(&mut block, new_size));
    if status == 0 {
        *slot = block.map_or(ptr::null_mut(), NonNull::as_ptr);
    }
    status
}

/// Free the block pointed at by `*slot`, if any, and null the pointer
///
/// # Safety
/// - Null-safe for both `slot` and `*slot` (no-ops)
/// - `*slot` must otherwise be a live block from this allocator
#[no_mangle]
pub unsafe extern "C" fn pyrite_release(slot: *mut *mut u8) {
    let Some(slot) = slot.as_mut() else {
        return;
    };

    let mut block = NonNull::new(*slot);
    alloc::release(&mut block);
    *slot = ptr::null_mut();
}

/// Enable allocation statistics, resetting the counters
#[no_mangle]
pub extern "C" fn pyrite_tracking_enable() {
    alloc::enable();
}

/// Disable allocation statistics
#[no_mangle]
pub extern "C" fn pyrite_tracking_disable() {
    alloc::disable();
}

/// Allocation statistics snapshot for C callers
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct PyriteMemoryStats {
    pub total_allocated: usize,
    pub total_freed: usize,
    pub current_allocated: usize,
    pub peak_allocated: usize,
    pub allocation_count: usize,
    pub free_count: usize,
}

/// Read the statistics counters
#[no_mangle]
pub extern "C" fn pyrite_memory_stats() -> PyriteMemoryStats {
    let snapshot = alloc::stats();
    PyriteMemoryStats {
        total_allocated: snapshot.total_allocated,
        total_freed: snapshot.total_freed,
        current_allocated: snapshot.current_allocated,
        peak_allocated: snapshot.peak_allocated,
        allocation_count: snapshot.allocation_count,
        free_count: snapshot.free_count,
    }
}

/// Emit the statistics counters through the logging layer
#[no_mangle]
pub extern "C" fn pyrite_log_memory_stats() {
    alloc::log_stats();
}

/// True if counted allocations are unmatched by frees
#[no_mangle]
pub extern "C" fn pyrite_has_leaks() -> bool {
    alloc::has_leaks()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn alloc_and_release_through_a_c_slot() {
        let mut ptr = pyrite_alloc(32);
        assert!(!ptr.is_null());

        unsafe {
            std::ptr::write_bytes(ptr, 0x11, 32);
            pyrite_release(&mut ptr);
        }
        assert!(ptr.is_null());

        // Releasing the already-nulled slot is a no-op
        unsafe { pyrite_release(&mut ptr) };
        assert!(ptr.is_null());
    }

    #[test]
    fn failed_alloc_returns_null_and_sets_the_slot() {
        crate::error::clear_last_error();

        assert!(pyrite_alloc(0).is_null());
        assert_eq!(
            super::super::pyrite_last_error_code(),
            ErrorKind::InvalidArgument.code()
        );
    }

    #[test]
    fn realloc_moves_the_caller_pointer() {
        let mut ptr = pyrite_alloc(8);
        unsafe {
            *ptr = 42;
            assert_eq!(pyrite_realloc(&mut ptr, 1024), 0);
            assert_eq!(*ptr, 42);

            assert_eq!(pyrite_realloc(&mut ptr, 0), 0);
        }
        assert!(ptr.is_null());
    }
}
