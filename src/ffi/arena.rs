//! Arena pool - C API for same-lifetime bulk allocation
//!
//! The C surface hands out raw region pointers. A pointer is valid only
//! until the arena next grows or is reset; generated code allocates
//! everything first or re-derives pointers after growth. (The safe Rust
//! API uses offset handles instead and has no such caveat.)

use crate::arena::Arena;
use crate::error::RuntimeError;
use std::ptr;

/// Create an arena; a zero capacity selects the default (4096)
///
/// Null on allocation failure (see the last-error slot).
#[no_mangle]
pub extern "C" fn pyrite_arena_new(initial_capacity: usize) -> *mut Arena {
    match Arena::with_capacity(initial_capacity) {
        Ok(arena) => Box::into_raw(Box::new(arena)),
        Err(_) => ptr::null_mut(),
    }
}

/// Bump-allocate `size` bytes, growing the backing buffer if needed
///
/// The returned pointer is invalidated by the next growth or reset.
///
/// # Safety
/// `arena` must be null (rejected) or a live arena from
/// [`pyrite_arena_new`].
#[no_mangle]
pub unsafe extern "C" fn pyrite_arena_alloc(arena: *mut Arena, size: usize) -> *mut u8 {
    let Some(arena) = arena.as_mut() else {
        RuntimeError::invalid_argument("arena is null".to_string());
        return ptr::null_mut();
    };

    match arena.alloc(size) {
        Ok(slot) => arena.bytes_mut(slot).as_mut_ptr(),
        Err(_) => ptr::null_mut(),
    }
}

/// Next free offset (0 for null)
///
/// # Safety
/// `arena` must be null or a live arena.
#[no_mangle]
pub unsafe extern "C" fn pyrite_arena_used(arena: *const Arena) -> usize {
    arena.as_ref().map_or(0, Arena::used)
}

/// Current backing capacity (0 for null)
///
/// # Safety
/// `arena` must be null or a live arena.
#[no_mangle]
pub unsafe extern "C" fn pyrite_arena_capacity(arena: *const Arena) -> usize {
    arena.as_ref().map_or(0, Arena::capacity)
}

/// Recycle the arena in O(1), invalidating outstanding pointers
///
/// # Safety
/// `arena` must be null (no-op) or a live arena.
#[no_mangle]
pub unsafe extern "C" fn pyrite_arena_reset(arena: *mut Arena) {
    if let Some(arena) = arena.as_mut() {
        arena.reset();
    }
}

/// Destroy the arena and its backing buffer
///
/// # Safety
/// `arena` must be null (no-op) or a live arena from
/// [`pyrite_arena_new`], not used again afterwards.
#[no_mangle]
pub unsafe extern "C" fn pyrite_arena_free(arena: *mut Arena) {
    if arena.is_null() {
        return;
    }

    drop(Box::from_raw(arena));
}
