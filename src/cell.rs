//! Reference-counted cells - shared ownership with a last-release destructor
//!
//! Design: One heap block holding a header and the inline payload:
//! - Cloning a handle is a count increment, dropping is a decrement
//! - The destructor (if any) runs on the payload exactly once, when the
//!   count falls to zero; then the whole block is freed
//! - Counts are plain, not atomic: handles are `!Send`/`!Sync`, so a
//!   cell lives and dies on one thread (callers wanting cross-thread
//!   sharing add their own synchronization)

use crate::error::{Result, RuntimeError};
use std::alloc::{self, Layout};
use std::cell::Cell;
use std::marker::PhantomData;
use std::ptr::NonNull;

/// Destructor invoked on the payload pointer on last release
///
/// C ABI so generated code can hand destructors across the FFI.
pub type Destructor = unsafe extern "C" fn(*mut u8);

/// Cell prefix; the payload lives immediately after it
#[repr(C, align(16))]
struct CellHeader {
    count: Cell<usize>,
    data_size: usize,
    destructor: Option<Destructor>,
}

const CELL_HEADER_SIZE: usize = std::mem::size_of::<CellHeader>();
const CELL_ALIGN: usize = std::mem::align_of::<CellHeader>();

/// Handle to a reference-counted heap cell
pub struct RcCell {
    header: NonNull<CellHeader>,
    // Raw-pointer marker keeps handles off other threads; the count is
    // a plain Cell
    _single_thread: PhantomData<*mut u8>,
}

impl RcCell {
    /// Allocate a cell with `data_size` payload bytes and a count of 1
    ///
    /// The payload is uninitialized; the creating holder writes it
    /// through [`data`](Self::data) before sharing the cell.
    pub fn create(data_size: usize, destructor: Option<Destructor>) -> Result<Self> {
        let total = CELL_HEADER_SIZE
            .checked_add(data_size)
            .filter(|&n| n <= isize::MAX as usize)
            .ok_or_else(|| {
                RuntimeError::overflow(format!("cell payload of {data_size} bytes overflows"))
            })?;

        // SAFETY: `total` is nonzero (header included) and within the
        // `isize` ceiling checked above.
        unsafe {
            let layout = Layout::from_size_align_unchecked(total, CELL_ALIGN);
            let Some(block) = NonNull::new(alloc::alloc(layout)) else {
                return Err(RuntimeError::out_of_memory(format!(
                    "failed to allocate cell with {data_size} payload bytes"
                )));
            };

            let header = block.cast::<CellHeader>();
            header.as_ptr().write(CellHeader {
                count: Cell::new(1),
                data_size,
                destructor,
            });

            Ok(Self {
                header,
                _single_thread: PhantomData,
            })
        }
    }

    /// Take another owning handle, incrementing the count
    ///
    /// Returns the new handle so call sites can retain and store in one
    /// expression.
    #[inline]
    pub fn retain(&self) -> Self {
        let header = self.header_ref();
        header.count.set(header.count.get() + 1);
        Self {
            header: self.header,
            _single_thread: PhantomData,
        }
    }

    /// Give up this handle, decrementing the count
    ///
    /// Identical to dropping the handle; spelled out for call sites that
    /// mirror the generated code's explicit release calls.
    #[inline]
    pub fn release(self) {
        drop(self);
    }

    /// Current owner count
    #[inline]
    pub fn count(&self) -> usize {
        self.header_ref().count.get()
    }

    /// Payload size in bytes
    #[inline]
    pub fn data_size(&self) -> usize {
        self.header_ref().data_size
    }

    /// Pointer to the inline payload
    #[inline]
    pub fn data(&self) -> NonNull<u8> {
        // SAFETY: the payload starts right after the live header.
        unsafe { NonNull::new_unchecked(self.header.as_ptr().cast::<u8>().add(CELL_HEADER_SIZE)) }
    }

    /// Convert to a raw handle without releasing
    ///
    /// The caller takes over this handle's count obligation; pair with
    /// [`from_raw`](Self::from_raw).
    #[inline]
    pub fn into_raw(self) -> *mut u8 {
        let raw = self.header.as_ptr().cast::<u8>();
        std::mem::forget(self);
        raw
    }

    /// Rebuild a handle from [`into_raw`](Self::into_raw) output
    ///
    /// # Safety
    /// `raw` must come from `into_raw` and carry exactly one
    /// not-yet-reclaimed count obligation.
    #[inline]
    pub unsafe fn from_raw(raw: *mut u8) -> Self {
        Self {
            header: NonNull::new_unchecked(raw.cast::<CellHeader>()),
            _single_thread: PhantomData,
        }
    }

    #[inline]
    fn header_ref(&self) -> &CellHeader {
        // SAFETY: the header outlives every handle; a live handle means
        // the count has not reached zero.
        unsafe { self.header.as_ref() }
    }
}

impl Clone for RcCell {
    #[inline]
    fn clone(&self) -> Self {
        self.retain()
    }
}

impl Drop for RcCell {
    #[inline]
    fn drop(&mut self) {
        let header = self.header_ref();
        let count = header.count.get();

        if count <= 1 {
            // SAFETY: last handle; nothing can observe the cell after
            // this point.
            unsafe { destroy(self.header) };
        } else {
            header.count.set(count - 1);
        }
    }
}

// Raw-handle operations for the C interface; the FFI works on the
// header pointer that `into_raw` exposes.

/// Increment the count behind a raw handle
///
/// # Safety
/// `raw` must be a live handle from [`RcCell::into_raw`].
#[inline]
pub(crate) unsafe fn retain_raw(raw: *mut u8) {
    let header = &*raw.cast::<CellHeader>();
    header.count.set(header.count.get() + 1);
}

/// Decrement the count behind a raw handle, destroying at zero
///
/// # Safety
/// `raw` must be a live handle from [`RcCell::into_raw`]; it must not
/// be used again after this call unless other counts remain.
#[inline]
pub(crate) unsafe fn release_raw(raw: *mut u8) {
    let header = NonNull::new_unchecked(raw.cast::<CellHeader>());
    let count = header.as_ref().count.get();

    if count <= 1 {
        destroy(header);
    } else {
        header.as_ref().count.set(count - 1);
    }
}

/// Read the count behind a raw handle
///
/// # Safety
/// `raw` must be a live handle from [`RcCell::into_raw`].
#[inline]
pub(crate) unsafe fn count_raw(raw: *const u8) -> usize {
    (*raw.cast::<CellHeader>()).count.get()
}

/// Payload pointer behind a raw handle
///
/// # Safety
/// `raw` must be a live handle from [`RcCell::into_raw`].
#[inline]
pub(crate) unsafe fn data_raw(raw: *mut u8) -> *mut u8 {
    raw.add(CELL_HEADER_SIZE)
}

/// Run the destructor and free the block (cold path)
///
/// # Safety
/// `header` must point at a live cell whose count has reached zero.
#[cold]
unsafe fn destroy(header: NonNull<CellHeader>) {
    let data_size = header.as_ref().data_size;
    let destructor = header.as_ref().destructor;

    if let Some(drop_fn) = destructor {
        let payload = header.as_ptr().cast::<u8>().add(CELL_HEADER_SIZE);
        drop_fn(payload);
    }

    let layout = Layout::from_size_align_unchecked(CELL_HEADER_SIZE + data_size, CELL_ALIGN);
    alloc::dealloc(header.as_ptr().cast::<u8>(), layout);
}
