//! Pyrite Runtime - memory and indexing support for translated programs
//!
//! This crate provides the core runtime support statically linked into
//! programs translated from a dynamic language to native code: checked
//! allocation with optional statistics, arena pooling, scope-based
//! cleanup, reference-counted cells, growable string buffers, and
//! negative-index/slice normalization.

pub mod alloc;
pub mod arena;
pub mod buffer;
pub mod cell;
pub mod error;
pub mod ffi;
pub mod logging;
pub mod scope;
pub mod seq;

// Re-export core types
pub use arena::{Arena, ArenaSlot};
pub use buffer::StrBuf;
pub use cell::RcCell;
pub use error::{ErrorKind, Result, RuntimeError};
pub use scope::Scope;
pub use seq::{normalize_index, normalize_slice, NormalizedSlice, SliceSpec, StepRange};

/// Runtime initialization
#[no_mangle]
pub extern "C" fn pyrite_runtime_init() {
    logging::init();
    logging::debug!("runtime initialized");
}

/// Runtime cleanup
#[no_mangle]
pub extern "C" fn pyrite_runtime_cleanup() {
    if alloc::is_enabled() {
        alloc::log_stats();
    }
    logging::debug!("runtime cleanup complete");
}
