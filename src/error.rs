//! Error reporting - kinds, messages, and the last-error slot
//!
//! Design: Dual reporting channel for a runtime consumed by generated code:
//! - Every fallible operation returns `Result` for Rust callers
//! - The same failure is recorded in a per-thread slot for C callers
//!   that only see a null pointer or an error code
//!
//! Kinds mirror the exceptions of the source language the generated
//! programs were translated from.

use std::cell::RefCell;
use std::fmt;

/// Runtime operation result
pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Failure categories produced by this runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Absent, zero, or malformed input
    InvalidArgument,
    /// The underlying allocator returned nothing
    OutOfMemory,
    /// Index or slice offset outside `[0, len)` after normalization
    IndexOutOfRange,
    /// Arithmetic that would exceed the representable size
    Overflow,
}

impl ErrorKind {
    /// Stable code for the C interface (0 is reserved for success)
    #[inline]
    pub fn code(self) -> i32 {
        match self {
            Self::InvalidArgument => 1,
            Self::OutOfMemory => 2,
            Self::IndexOutOfRange => 3,
            Self::Overflow => 4,
        }
    }

    /// Exception name as the source language spells it
    pub fn name(self) -> &'static str {
        match self {
            Self::InvalidArgument => "ValueError",
            Self::OutOfMemory => "MemoryError",
            Self::IndexOutOfRange => "IndexError",
            Self::Overflow => "OverflowError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A recorded runtime failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeError {
    pub kind: ErrorKind,
    pub message: String,
}

impl RuntimeError {
    /// Build an error without touching the last-error slot
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Raise: build the error and record it in the thread's slot
    ///
    /// All runtime operations fail through this path (or one of the
    /// kind-specific helpers below) so the `Result` channel and the slot
    /// always agree.
    pub fn raise(kind: ErrorKind, message: impl Into<String>) -> Self {
        let err = Self::new(kind, message);
        set_last_error(&err);
        err
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::raise(ErrorKind::InvalidArgument, message)
    }

    pub fn out_of_memory(message: impl Into<String>) -> Self {
        Self::raise(ErrorKind::OutOfMemory, message)
    }

    pub fn index_out_of_range(message: impl Into<String>) -> Self {
        Self::raise(ErrorKind::IndexOutOfRange, message)
    }

    pub fn overflow(message: impl Into<String>) -> Self {
        Self::raise(ErrorKind::Overflow, message)
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for RuntimeError {}

// One slot per logical thread of control. The original design kept a
// single process-wide slot; per-thread slots keep the contract without
// cross-thread races.
thread_local! {
    static LAST_ERROR: RefCell<Option<RuntimeError>> = const { RefCell::new(None) };
}

/// Record an error in this thread's slot, replacing any previous one
pub fn set_last_error(err: &RuntimeError) {
    LAST_ERROR.with(|slot| *slot.borrow_mut() = Some(err.clone()));
}

/// Most recent failure on this thread, if any
pub fn last_error() -> Option<RuntimeError> {
    LAST_ERROR.with(|slot| slot.borrow().clone())
}

/// True if a failure is pending on this thread
pub fn has_error() -> bool {
    LAST_ERROR.with(|slot| slot.borrow().is_some())
}

/// Clear the slot
pub fn clear_last_error() {
    LAST_ERROR.with(|slot| *slot.borrow_mut() = None);
}

/// Take the pending failure out of the slot, leaving it clear
pub fn take_last_error() -> Option<RuntimeError> {
    LAST_ERROR.with(|slot| slot.borrow_mut().take())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raise_records_into_slot() {
        clear_last_error();

        let err = RuntimeError::out_of_memory("failed to allocate 64 bytes");
        assert!(has_error());

        let recorded = last_error().expect("slot populated");
        assert_eq!(recorded, err);
        assert_eq!(recorded.kind, ErrorKind::OutOfMemory);
    }

    #[test]
    fn take_clears_the_slot() {
        RuntimeError::invalid_argument("zero-size allocation");

        assert!(take_last_error().is_some());
        assert!(!has_error());
        assert!(last_error().is_none());
    }

    #[test]
    fn plain_new_does_not_touch_the_slot() {
        clear_last_error();

        let _ = RuntimeError::new(ErrorKind::Overflow, "count * elem_size overflows");
        assert!(!has_error());
    }

    #[test]
    fn display_uses_source_language_names() {
        let err = RuntimeError::new(ErrorKind::IndexOutOfRange, "index 7 out of range");
        assert_eq!(err.to_string(), "IndexError: index 7 out of range");
        assert_eq!(ErrorKind::OutOfMemory.name(), "MemoryError");
    }

    #[test]
    fn codes_are_stable_and_nonzero() {
        for kind in [
            ErrorKind::InvalidArgument,
            ErrorKind::OutOfMemory,
            ErrorKind::IndexOutOfRange,
            ErrorKind::Overflow,
        ] {
            assert!(kind.code() > 0);
        }
    }
}
