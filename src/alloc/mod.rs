//! Tracked allocation - checked raw blocks over the system allocator
//!
//! Design: Every block is prefixed with a one-word header recording its
//! full layout, so release and realloc can rebuild the `Layout` the
//! system allocator requires without the caller carrying sizes around.
//! Overflow is checked before any arithmetic that could wrap.
//!
//! Callers hold blocks in an `Option<NonNull<u8>>` slot; `release` clears
//! the slot after freeing so a stale handle cannot double-free.

mod tracking;


pub use tracking::{disable, enable, has_leaks, is_enabled, log_stats, stats, MemoryStats};

use crate::error::{Result, RuntimeError};
use crate::logging::{log_allocation, log_release};
use std::alloc::{self, Layout};
use std::ptr::NonNull;

/// Blocks are aligned for any payload the generated code stores in them
const BLOCK_ALIGN: usize = 16;

/// Per-block prefix, sized to preserve payload alignment
#[repr(C, align(16))]
struct BlockHeader {
    /// Full size of the block including this header
    size: usize,
}

const HEADER_SIZE: usize = std::mem::size_of::<BlockHeader>();

/// Allocate `size` bytes
///
/// Zero-size requests are rejected rather than turned into a degenerate
/// valid block.
pub fn alloc(size: usize) -> Result<NonNull<u8>> {
    if size == 0 {
        return Err(RuntimeError::invalid_argument(
            "attempted to allocate 0 bytes",
        ));
    }

    let ptr = raw_alloc(size, false)?;
    tracking::record_alloc(size);
    log_allocation(size, ptr.as_ptr());
    Ok(ptr)
}

/// Allocate a zero-initialized array of `count` elements of `elem_size` bytes
///
/// The overflow check runs before the multiply.
pub fn alloc_zeroed(count: usize, elem_size: usize) -> Result<NonNull<u8>> {
    if count == 0 || elem_size == 0 {
        return Err(RuntimeError::invalid_argument(
            "attempted to allocate 0 elements or 0 bytes",
        ));
    }
    if count > usize::MAX / elem_size {
        return Err(RuntimeError::overflow(format!(
            "{count} elements of {elem_size} bytes overflow the address space"
        )));
    }

    let size = count * elem_size;
    let ptr = raw_alloc(size, true)?;
    tracking::record_alloc(size);
    log_allocation(size, ptr.as_ptr());
    Ok(ptr)
}

/// Resize the block held in `slot` to `new_size` bytes
///
/// `new_size == 0` releases the block and leaves the slot empty (success,
/// not an error). On failure the slot and its block are untouched.
///
/// Statistics are only updated when growing from an empty slot; an
/// in-place resize is not re-counted. This understates the byte totals
/// and is a known precision limitation of the tracking feature.
pub fn realloc(slot: &mut Option<NonNull<u8>>, new_size: usize) -> Result<()> {
    if new_size == 0 {
        release(slot);
        return Ok(());
    }

    let Some(payload) = *slot else {
        let ptr = raw_alloc(new_size, false)?;
        tracking::record_realloc_fresh(new_size);
        log_allocation(new_size, ptr.as_ptr());
        *slot = Some(ptr);
        return Ok(());
    };

    let new_total = checked_block_size(new_size)?;

    // SAFETY: `payload` came from `raw_alloc`, so a live header sits
    // immediately before it and records the layout it was created with.
    unsafe {
        let header = header_ptr(payload);
        let old_total = (*header).size;
        let old_layout = Layout::from_size_align_unchecked(old_total, BLOCK_ALIGN);

        let moved = alloc::realloc(header.cast::<u8>(), old_layout, new_total);
        let Some(moved) = NonNull::new(moved) else {
            return Err(RuntimeError::out_of_memory(format!(
                "failed to reallocate to {new_size} bytes"
            )));
        };

        let header = moved.cast::<BlockHeader>().as_ptr();
        (*header).size = new_total;
        *slot = Some(payload_ptr(moved.cast()));
    }

    Ok(())
}

/// Free the block held in `slot`, if any, and clear the slot
///
/// Safe to call on an empty slot, and safe to call twice through the same
/// slot: the first call empties it.
///
/// Only the free count is updated; freed bytes are not subtracted from
/// the current-allocated counter (the free path does not consult the
/// block size — a known precision limitation, kept as documented
/// behavior).
pub fn release(slot: &mut Option<NonNull<u8>>) {
    let Some(payload) = slot.take() else {
        return;
    };

    tracking::record_free();
    log_release(payload.as_ptr());

    // SAFETY: `payload` came from `raw_alloc`; the header before it holds
    // the exact layout the block was allocated with.
    unsafe {
        let header = header_ptr(payload);
        let total = (*header).size;
        let layout = Layout::from_size_align_unchecked(total, BLOCK_ALIGN);
        alloc::dealloc(header.cast::<u8>(), layout);
    }
}

/// Bounds-checked copy of `src` into `dest`
pub fn copy_into(dest: &mut [u8], src: &[u8]) -> Result<()> {
    if src.len() > dest.len() {
        return Err(RuntimeError::invalid_argument(format!(
            "source size {} exceeds destination size {}",
            src.len(),
            dest.len()
        )));
    }

    dest[..src.len()].copy_from_slice(src);
    Ok(())
}

/// Bounds-checked fill of the first `count` bytes of `dest` with `value`
pub fn fill(dest: &mut [u8], value: u8, count: usize) -> Result<()> {
    if count > dest.len() {
        return Err(RuntimeError::invalid_argument(format!(
            "count {} exceeds destination size {}",
            count,
            dest.len()
        )));
    }

    dest[..count].fill(value);
    Ok(())
}

/// Allocate a headered block and return the payload pointer
fn raw_alloc(size: usize, zeroed: bool) -> Result<NonNull<u8>> {
    let total = checked_block_size(size)?;

    // SAFETY: `total` is nonzero (header included) and within `isize`
    // per `checked_block_size`; the layout is therefore valid.
    unsafe {
        let layout = Layout::from_size_align_unchecked(total, BLOCK_ALIGN);
        let raw = if zeroed {
            alloc::alloc_zeroed(layout)
        } else {
            alloc::alloc(layout)
        };

        let Some(block) = NonNull::new(raw) else {
            return Err(RuntimeError::out_of_memory(format!(
                "failed to allocate {size} bytes"
            )));
        };

        let header = block.cast::<BlockHeader>().as_ptr();
        (*header).size = total;
        Ok(payload_ptr(block.cast()))
    }
}

/// Header size plus payload, with the overflow and `isize` ceiling checks
/// the system allocator contract requires
fn checked_block_size(payload: usize) -> Result<usize> {
    let total = payload
        .checked_add(HEADER_SIZE)
        .filter(|&n| n <= isize::MAX as usize)
        .ok_or_else(|| {
            RuntimeError::overflow(format!("allocation of {payload} bytes overflows"))
        })?;
    Ok(total)
}

/// Payload pointer for a block pointer
///
/// # Safety
/// `block` must point at a live `BlockHeader`-prefixed block.
#[inline]
unsafe fn payload_ptr(block: NonNull<BlockHeader>) -> NonNull<u8> {
    NonNull::new_unchecked(block.as_ptr().cast::<u8>().add(HEADER_SIZE))
}

/// Header pointer for a payload pointer handed out by this module
///
/// # Safety
/// `payload` must have been returned by `raw_alloc` and not yet freed.
#[inline]
unsafe fn header_ptr(payload: NonNull<u8>) -> *mut BlockHeader {
    payload.as_ptr().sub(HEADER_SIZE).cast::<BlockHeader>()
}
