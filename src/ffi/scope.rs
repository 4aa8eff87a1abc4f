//! Scope registry - C API for joint cleanup of generated-code blocks

use crate::error::RuntimeError;
use crate::scope::Scope;
use std::ptr::{self, NonNull};

/// Create an empty scope
#[no_mangle]
pub extern "C" fn pyrite_scope_new() -> *mut Scope {
    Box::into_raw(Box::new(Scope::new()))
}

/// Allocate through the tracked allocator and register for cleanup
///
/// # Safety
/// `scope` must be null (rejected) or a live scope from
/// [`pyrite_scope_new`].
#[no_mangle]
pub unsafe extern "C" fn pyrite_scope_alloc(scope: *mut Scope, size: usize) -> *mut u8 {
    let Some(scope) = scope.as_mut() else {
        RuntimeError::invalid_argument("scope is null".to_string());
        return ptr::null_mut();
    };

    match scope.alloc(size) {
        Ok(block) => block.as_ptr(),
        Err(_) => ptr::null_mut(),
    }
}

/// Register an existing tracked-allocator block for cleanup
///
/// Returns 0 on success, a kind code otherwise. A null block is an
/// invalid argument, not a silent no-op.
///
/// # Safety
/// `scope` must be null (rejected) or a live scope; `ptr` must be null
/// (rejected) or a live tracked-allocator block not owned elsewhere.
#[no_mangle]
pub unsafe extern "C" fn pyrite_scope_register(scope: *mut Scope, ptr: *mut u8) -> i32 {
    let Some(scope) = scope.as_mut() else {
        return RuntimeError::invalid_argument("scope is null".to_string())
            .kind
            .code();
    };
    let Some(block) = NonNull::new(ptr) else {
        return RuntimeError::invalid_argument("registered pointer is null".to_string())
            .kind
            .code();
    };

    super::status_of(scope.register(block))
}

/// Destroy the scope, releasing every registered block newest-first
///
/// # Safety
/// `scope` must be null (no-op) or a live scope from
/// [`pyrite_scope_new`], not used again afterwards.
#[no_mangle]
pub unsafe extern "C" fn pyrite_scope_free(scope: *mut Scope) {
    if scope.is_null() {
        return;
    }

    drop(Box::from_raw(scope));
}
