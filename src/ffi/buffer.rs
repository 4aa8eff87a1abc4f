//! String buffer - C API for incremental output building
//!
//! The buffer keeps a NUL just past its content, so `pyrite_buf_cstr`
//! is always a valid C string without copying.

use crate::buffer::StrBuf;
use crate::error::RuntimeError;
use std::ffi::{c_char, CStr};
use std::ptr;

/// Create a buffer; a zero capacity selects the default (256)
///
/// Null on allocation failure (see the last-error slot).
#[no_mangle]
pub extern "C" fn pyrite_buf_new(initial_capacity: usize) -> *mut StrBuf {
    match StrBuf::with_capacity(initial_capacity) {
        Ok(buf) => Box::into_raw(Box::new(buf)),
        Err(_) => ptr::null_mut(),
    }
}

/// Append `len` raw bytes
///
/// Returns 0 on success, a kind code otherwise. A failed growth leaves
/// the buffer unchanged.
///
/// # Safety
/// `buf` must be null (rejected) or a live buffer; `data` must be null
/// (rejected unless `len == 0`) or readable for `len` bytes.
#[no_mangle]
pub unsafe extern "C" fn pyrite_buf_append(buf: *mut StrBuf, data: *const u8, len: usize) -> i32 {
    let Some(buf) = buf.as_mut() else {
        return RuntimeError::invalid_argument("buffer is null".to_string())
            .kind
            .code();
    };
    if data.is_null() && len > 0 {
        return RuntimeError::invalid_argument("append source is null".to_string())
            .kind
            .code();
    }

    let bytes = if len == 0 {
        &[]
    } else {
        std::slice::from_raw_parts(data, len)
    };
    super::status_of(buf.append(bytes))
}

/// Append a NUL-terminated string
///
/// # Safety
/// `buf` must be null (rejected) or a live buffer; `text` must be null
/// (rejected) or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn pyrite_buf_append_str(buf: *mut StrBuf, text: *const c_char) -> i32 {
    let Some(buf) = buf.as_mut() else {
        return RuntimeError::invalid_argument("buffer is null".to_string())
            .kind
            .code();
    };
    if text.is_null() {
        return RuntimeError::invalid_argument("append string is null".to_string())
            .kind
            .code();
    }

    let bytes = CStr::from_ptr(text).to_bytes();
    super::status_of(buf.append(bytes))
}

/// Content as a NUL-terminated string (null for null)
///
/// The pointer is invalidated by the next mutating call.
///
/// # Safety
/// `buf` must be null or a live buffer.
#[no_mangle]
pub unsafe extern "C" fn pyrite_buf_cstr(buf: *const StrBuf) -> *const c_char {
    let Some(buf) = buf.as_ref() else {
        return ptr::null();
    };

    buf.terminated_bytes().as_ptr().cast::<c_char>()
}

/// Logical content length, terminator excluded (0 for null)
///
/// # Safety
/// `buf` must be null or a live buffer.
#[no_mangle]
pub unsafe extern "C" fn pyrite_buf_size(buf: *const StrBuf) -> usize {
    buf.as_ref().map_or(0, StrBuf::len)
}

/// Drop the content, keeping capacity
///
/// # Safety
/// `buf` must be null (no-op) or a live buffer.
#[no_mangle]
pub unsafe extern "C" fn pyrite_buf_clear(buf: *mut StrBuf) {
    if let Some(buf) = buf.as_mut() {
        buf.clear();
    }
}

/// Destroy the buffer
///
/// # Safety
/// `buf` must be null (no-op) or a live buffer from
/// [`pyrite_buf_new`], not used again afterwards.
#[no_mangle]
pub unsafe extern "C" fn pyrite_buf_free(buf: *mut StrBuf) {
    if buf.is_null() {
        return;
    }

    drop(Box::from_raw(buf));
}
