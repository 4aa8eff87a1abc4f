//! C FFI - stable ABI for generated code
//!
//! Design: Null-safe C bindings over the safe runtime types:
//! 1. Allocation and slot-based release (caller pointers are zeroed)
//! 2. Scope, arena, cell, and buffer lifecycles behind opaque pointers
//! 3. Index/slice normalization with plain structs and error codes
//! 4. Error propagation via null returns plus the last-error slot
//!
//! Every failing call returns null or a nonzero kind code and records
//! the failure in the calling thread's last-error slot.

mod arena;
mod buffer;
mod cell;
mod memory;
mod scope;
mod seq;

pub use arena::{
    pyrite_arena_alloc, pyrite_arena_capacity, pyrite_arena_free, pyrite_arena_new,
    pyrite_arena_reset, pyrite_arena_used,
};
pub use buffer::{
    pyrite_buf_append, pyrite_buf_append_str, pyrite_buf_clear, pyrite_buf_cstr, pyrite_buf_free,
    pyrite_buf_new, pyrite_buf_size,
};
pub use cell::{
    pyrite_cell_count, pyrite_cell_data, pyrite_cell_new, pyrite_cell_release, pyrite_cell_retain,
};
pub use memory::{
    pyrite_alloc, pyrite_alloc_zeroed, pyrite_has_leaks, pyrite_log_memory_stats,
    pyrite_memory_stats, pyrite_realloc, pyrite_release, pyrite_tracking_disable,
    pyrite_tracking_enable, PyriteMemoryStats,
};
pub use scope::{pyrite_scope_alloc, pyrite_scope_free, pyrite_scope_new, pyrite_scope_register};
pub use seq::{
    pyrite_normalize_index, pyrite_normalize_slice, pyrite_slice_full, pyrite_slice_new,
    pyrite_slice_range, RawNormalizedSlice, RawSliceSpec,
};

use crate::error;
use std::cell::RefCell;
use std::ffi::{c_char, CString};
use std::ptr;

// The C-visible copy of the current message; refreshed on each query so
// the returned pointer stays valid until the next failing call or clear
// on this thread.
thread_local! {
    static MESSAGE_BUF: RefCell<CString> = RefCell::new(CString::default());
}

/// Kind code of the most recent failure on this thread (0 when clear)
#[no_mangle]
pub extern "C" fn pyrite_last_error_code() -> i32 {
    error::last_error().map_or(0, |err| err.kind.code())
}

/// Formatted message of the most recent failure on this thread
///
/// Returns null when no failure is pending. The pointer remains valid
/// until the next failing runtime call or [`pyrite_clear_error`] on the
/// same thread.
#[no_mangle]
pub extern "C" fn pyrite_last_error_message() -> *const c_char {
    let Some(err) = error::last_error() else {
        return ptr::null();
    };

    MESSAGE_BUF.with(|buf| {
        let rendered = CString::new(err.to_string()).unwrap_or_default();
        *buf.borrow_mut() = rendered;
        buf.borrow().as_ptr()
    })
}

/// True if a failure is pending on this thread
#[no_mangle]
pub extern "C" fn pyrite_has_error() -> bool {
    error::has_error()
}

/// Clear this thread's failure slot
#[no_mangle]
pub extern "C" fn pyrite_clear_error() {
    error::clear_last_error();
}

/// Code for a fallible call that produced no value on failure
#[inline]
pub(crate) fn status_of<T>(result: crate::error::Result<T>) -> i32 {
    match result {
        Ok(_) => 0,
        Err(err) => err.kind.code(),
    }
}
