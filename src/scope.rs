//! Scope registry - joint release of tracked blocks on scope exit
//!
//! Design: An ownership list standing in for nested resource
//! acquisition: blocks registered into a scope are released together,
//! newest first, when the scope is dropped. Because teardown rides on
//! `Drop`, every exit path of the enclosing Rust scope is covered,
//! early returns and error paths included.
//!
//! The scope owns only the release obligation, never the meaning of the
//! bytes behind a pointer.

use crate::alloc;
use crate::error::{Result, RuntimeError};
use crate::logging::log_scope_teardown;
use std::ptr::NonNull;

/// Stack of tracked-allocator blocks released together in reverse
/// registration order
pub struct Scope {
    blocks: Vec<NonNull<u8>>,
}

impl Scope {
    /// Create an empty scope
    pub fn new() -> Self {
        Self { blocks: Vec::new() }
    }

    /// Allocate through the tracked allocator and register the block
    ///
    /// If registration bookkeeping fails after the block was allocated,
    /// the block is released before the error is returned - nothing
    /// leaks on this path.
    pub fn alloc(&mut self, size: usize) -> Result<NonNull<u8>> {
        let ptr = alloc::alloc(size)?;

        if let Err(err) = self.register(ptr) {
            let mut slot = Some(ptr);
            alloc::release(&mut slot);
            return Err(err);
        }

        Ok(ptr)
    }

    /// Register an existing tracked-allocator block for release on exit
    ///
    /// O(1) push; fails only if the registry itself cannot grow.
    pub fn register(&mut self, ptr: NonNull<u8>) -> Result<()> {
        self.blocks.try_reserve(1).map_err(|_| {
            RuntimeError::out_of_memory("failed to grow scope registry".to_string())
        })?;
        self.blocks.push(ptr);
        Ok(())
    }

    /// Number of blocks currently owned by the scope
    #[inline]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Registered blocks, newest first - the exact order `Drop` releases
    /// them in
    #[cfg(test)]
    pub(crate) fn release_order(&self) -> Vec<*mut u8> {
        self.blocks.iter().rev().map(|b| b.as_ptr()).collect()
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        let released = self.blocks.len();

        while let Some(ptr) = self.blocks.pop() {
            let mut slot = Some(ptr);
            alloc::release(&mut slot);
        }

        log_scope_teardown(released);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_registers_the_block() {
        let mut scope = Scope::new();

        scope.alloc(32).expect("scoped alloc");
        scope.alloc(64).expect("scoped alloc");

        assert_eq!(scope.len(), 2);
    }

    #[test]
    fn register_accepts_external_blocks() {
        let mut scope = Scope::new();
        let ptr = alloc::alloc(16).expect("external block");

        scope.register(ptr).expect("register");
        assert_eq!(scope.len(), 1);
        // Dropped scope releases the external block too
    }

    #[test]
    fn blocks_are_released_newest_first() {
        let mut scope = Scope::new();

        let p1 = scope.alloc(8).expect("p1");
        let p2 = scope.alloc(8).expect("p2");
        let p3 = scope.alloc(8).expect("p3");

        assert_eq!(
            scope.release_order(),
            vec![p3.as_ptr(), p2.as_ptr(), p1.as_ptr()]
        );
    }

    #[test]
    fn teardown_runs_on_early_exit_paths() {
        fn fallible(fail: bool) -> Result<()> {
            let mut scope = Scope::new();
            scope.alloc(128)?;

            if fail {
                // The scope drops here, releasing its block
                return Err(RuntimeError::invalid_argument("forced exit".to_string()));
            }

            Ok(())
        }

        assert!(fallible(true).is_err());
        assert!(fallible(false).is_ok());
    }

    #[test]
    fn writable_through_returned_pointer() {
        let mut scope = Scope::new();
        let ptr = scope.alloc(16).expect("scoped alloc");

        unsafe {
            std::ptr::write_bytes(ptr.as_ptr(), 0xC3, 16);
            assert_eq!(*ptr.as_ptr().add(15), 0xC3);
        }
    }
}
