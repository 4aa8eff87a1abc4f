//! Reference counting - C API for shared-ownership cells
//!
//! Hot path operations with minimal overhead; destruction is the cold
//! path. Null handles read as count 0 and no data rather than failing.

use crate::cell::{self, Destructor, RcCell};
use std::ptr;

/// Create a cell with `data_size` payload bytes and a count of 1
///
/// Returns the raw handle, or null on failure (see the last-error
/// slot). The payload is uninitialized.
#[no_mangle]
pub extern "C" fn pyrite_cell_new(data_size: usize, destructor: Option<Destructor>) -> *mut u8 {
    match RcCell::create(data_size, destructor) {
        Ok(cell) => cell.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Increment the count and return the same handle (for chaining)
///
/// # Safety
/// - Null-safe (returns null)
/// - Otherwise `cell` must be a live handle from [`pyrite_cell_new`]
#[no_mangle]
pub unsafe extern "C" fn pyrite_cell_retain(cell: *mut u8) -> *mut u8 {
    if cell.is_null() {
        return ptr::null_mut();
    }

    cell::retain_raw(cell);
    cell
}

/// Decrement the count, destroying the cell when it reaches zero
///
/// The destructor (if any) runs on the payload pointer exactly once,
/// then the block is freed. The handle must not be used after its own
/// release.
///
/// # Safety
/// - Null-safe (no-op)
/// - Otherwise `cell` must be a live handle carrying one count
#[no_mangle]
pub unsafe extern "C" fn pyrite_cell_release(cell: *mut u8) {
    if cell.is_null() {
        return;
    }

    cell::release_raw(cell);
}

/// Current owner count (0 for null)
///
/// # Safety
/// `cell` must be null or a live handle.
#[no_mangle]
pub unsafe extern "C" fn pyrite_cell_count(cell: *const u8) -> usize {
    if cell.is_null() {
        return 0;
    }

    cell::count_raw(cell)
}

/// Payload pointer (null for null)
///
/// # Safety
/// `cell` must be null or a live handle.
#[no_mangle]
pub unsafe extern "C" fn pyrite_cell_data(cell: *mut u8) -> *mut u8 {
    if cell.is_null() {
        return ptr::null_mut();
    }

    cell::data_raw(cell)
}
