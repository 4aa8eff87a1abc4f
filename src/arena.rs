//! Arena pool - bump allocation over one growable backing buffer
//!
//! Design: Many same-lifetime allocations served from a single buffer:
//! - Allocation is O(1), a word-aligned bump of the `used` cursor
//! - The whole arena is recycled at once; `reset` is O(1)
//! - Growth doubles the backing buffer, which may relocate it
//!
//! Callers receive offset handles rather than addresses, so relocation on
//! growth cannot leave them dangling. A `reset` invalidates outstanding
//! handles; resolving one afterwards panics like any out-of-range
//! indexing (caller contract).

use crate::error::{Result, RuntimeError};
use crate::logging::log_arena_grow;

/// Backing buffer size used when none is requested
pub const DEFAULT_ARENA_CAPACITY: usize = 4096;

const WORD: usize = std::mem::size_of::<usize>();

/// Offset handle for a region handed out by [`Arena::alloc`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaSlot {
    offset: usize,
    len: usize,
}

impl ArenaSlot {
    /// Byte offset of the region inside the arena
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Requested length of the region
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Bump allocator over one growable, exclusively-owned backing buffer
pub struct Arena {
    data: Vec<u8>,
    used: usize,
    count: usize,
}

impl Arena {
    /// Create an arena with the default backing capacity
    pub fn new() -> Result<Self> {
        Self::with_capacity(DEFAULT_ARENA_CAPACITY)
    }

    /// Create an arena with `initial_capacity` bytes of backing
    ///
    /// A zero capacity falls back to the default.
    pub fn with_capacity(initial_capacity: usize) -> Result<Self> {
        let capacity = if initial_capacity == 0 {
            DEFAULT_ARENA_CAPACITY
        } else {
            initial_capacity
        };

        let mut data = Vec::new();
        data.try_reserve_exact(capacity).map_err(|_| {
            RuntimeError::out_of_memory(format!(
                "failed to allocate arena backing of {capacity} bytes"
            ))
        })?;
        data.resize(capacity, 0);

        Ok(Self {
            data,
            used: 0,
            count: 0,
        })
    }

    /// Hand out `size` bytes, bumping the cursor by the word-aligned size
    ///
    /// Grows the backing buffer by doubling until the request fits. On
    /// growth failure the arena is unchanged and stays usable at its
    /// prior capacity.
    pub fn alloc(&mut self, size: usize) -> Result<ArenaSlot> {
        let aligned = align_up(size)?;
        let required = self.used.checked_add(aligned).ok_or_else(|| {
            RuntimeError::overflow(format!("arena allocation of {size} bytes overflows"))
        })?;

        if required > self.capacity() {
            self.grow_to_fit(required)?;
        }

        let slot = ArenaSlot {
            offset: self.used,
            len: size,
        };
        self.used = required;
        self.count += 1;
        Ok(slot)
    }

    /// Resolve a slot to its bytes
    ///
    /// Panics if the slot lies beyond the in-use region, which is how a
    /// handle kept across a `reset` surfaces.
    pub fn bytes(&self, slot: ArenaSlot) -> &[u8] {
        &self.data[..self.used][slot.offset..slot.offset + slot.len]
    }

    /// Resolve a slot to its bytes, mutably
    pub fn bytes_mut(&mut self, slot: ArenaSlot) -> &mut [u8] {
        &mut self.data[..self.used][slot.offset..slot.offset + slot.len]
    }

    /// Next free offset
    #[inline]
    pub fn used(&self) -> usize {
        self.used
    }

    /// Current backing capacity
    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Number of regions handed out since creation or the last reset
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Rewind the cursor, recycling the whole arena in O(1)
    ///
    /// The backing buffer is kept. No per-region cleanup runs: the arena
    /// holds no per-region metadata, so anything needing a destructor
    /// must be tracked externally. Outstanding slots are invalidated.
    pub fn reset(&mut self) {
        self.used = 0;
        self.count = 0;
    }

    fn grow_to_fit(&mut self, required: usize) -> Result<()> {
        let mut new_capacity = self.capacity();
        while new_capacity < required {
            new_capacity = new_capacity.checked_mul(2).ok_or_else(|| {
                RuntimeError::overflow("arena capacity doubling overflows".to_string())
            })?;
        }

        self.data
            .try_reserve_exact(new_capacity - self.data.len())
            .map_err(|_| {
                RuntimeError::out_of_memory(format!(
                    "failed to grow arena backing to {new_capacity} bytes"
                ))
            })?;

        log_arena_grow(self.data.len(), new_capacity);
        self.data.resize(new_capacity, 0);
        Ok(())
    }
}

/// Round `size` up to the next word boundary
#[inline]
fn align_up(size: usize) -> Result<usize> {
    size.checked_add(WORD - 1)
        .map(|n| n & !(WORD - 1))
        .ok_or_else(|| RuntimeError::overflow(format!("size {size} overflows word alignment")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_capacity_applies() {
        let arena = Arena::new().expect("arena");
        assert_eq!(arena.capacity(), DEFAULT_ARENA_CAPACITY);

        let fallback = Arena::with_capacity(0).expect("arena");
        assert_eq!(fallback.capacity(), DEFAULT_ARENA_CAPACITY);
    }

    #[test]
    fn offsets_are_word_aligned_and_disjoint() {
        let mut arena = Arena::with_capacity(64).expect("arena");

        let sizes = [1usize, 7, 8, 24, 3, 100, 640];
        let mut slots = Vec::new();
        for &size in &sizes {
            slots.push(arena.alloc(size).expect("arena alloc"));
        }

        let total_aligned: usize = sizes.iter().map(|&s| align_up(s).unwrap()).sum();
        assert_eq!(arena.used(), total_aligned);
        assert!(arena.capacity() >= total_aligned);
        assert_eq!(arena.count(), sizes.len());

        for (slot, &size) in slots.iter().zip(&sizes) {
            assert_eq!(slot.offset() % WORD, 0);
            assert_eq!(slot.len(), size);
        }

        // No two handed-out regions overlap
        for (i, a) in slots.iter().enumerate() {
            for b in &slots[i + 1..] {
                let a_end = a.offset() + a.len();
                let b_end = b.offset() + b.len();
                assert!(a_end <= b.offset() || b_end <= a.offset());
            }
        }
    }

    #[test]
    fn growth_preserves_written_content() {
        let mut arena = Arena::with_capacity(16).expect("arena");

        let first = arena.alloc(8).expect("first");
        arena.bytes_mut(first).copy_from_slice(&[9, 8, 7, 6, 5, 4, 3, 2]);

        // Forces at least one doubling past the written region
        let _big = arena.alloc(256).expect("grow");

        assert_eq!(arena.bytes(first), &[9, 8, 7, 6, 5, 4, 3, 2]);
        assert!(arena.capacity() >= 264);
    }

    #[test]
    fn reset_rewinds_without_shrinking() {
        let mut arena = Arena::with_capacity(32).expect("arena");
        arena.alloc(100).expect("forces growth");
        let grown = arena.capacity();

        arena.reset();
        assert_eq!(arena.used(), 0);
        assert_eq!(arena.count(), 0);
        assert_eq!(arena.capacity(), grown);

        // The next allocation starts from the beginning again
        let slot = arena.alloc(8).expect("post-reset alloc");
        assert_eq!(slot.offset(), 0);
    }

    #[test]
    fn zero_size_region_is_permitted() {
        let mut arena = Arena::with_capacity(16).expect("arena");

        let slot = arena.alloc(0).expect("empty region");
        assert!(slot.is_empty());
        assert_eq!(arena.used(), 0);
        assert_eq!(arena.count(), 1);
        assert_eq!(arena.bytes(slot), &[] as &[u8]);
    }

    #[test]
    #[should_panic]
    fn stale_slot_after_reset_panics_on_resolve() {
        let mut arena = Arena::with_capacity(16).expect("arena");
        let slot = arena.alloc(8).expect("slot");

        arena.reset();
        // Nothing was handed out after the reset, so the backing range
        // check rejects the stale handle
        let _ = arena.bytes(slot);
    }
}
