//! String buffer - append-only byte builder with a maintained terminator
//!
//! Design: Output whose size is not known in advance is accumulated
//! here:
//! - Doubling growth, so appends are amortized O(1)
//! - One NUL byte always sits just past the content, so generated
//!   C-style code can read the buffer as a C string at any time
//! - A failed append leaves content and capacity exactly as they were
//!
//! Formatted appends probe the formatted length with a counting dry run
//! first, then grow once to fit.

use crate::error::{Result, RuntimeError};
use std::borrow::Cow;
use std::fmt;

/// Buffer capacity used when none is requested
pub const DEFAULT_BUFFER_CAPACITY: usize = 256;

/// Growable byte sequence with a trailing NUL terminator
///
/// Invariants: the backing vector always ends with the terminator, and
/// the logical length stays strictly below the capacity.
pub struct StrBuf {
    // Content bytes followed by one terminator byte
    data: Vec<u8>,
}

impl StrBuf {
    /// Create a buffer with the default capacity
    pub fn new() -> Result<Self> {
        Self::with_capacity(DEFAULT_BUFFER_CAPACITY)
    }

    /// Create a buffer with `initial_capacity` bytes
    ///
    /// A zero capacity falls back to the default.
    pub fn with_capacity(initial_capacity: usize) -> Result<Self> {
        let capacity = if initial_capacity == 0 {
            DEFAULT_BUFFER_CAPACITY
        } else {
            initial_capacity
        };

        let mut data = Vec::new();
        data.try_reserve_exact(capacity).map_err(|_| {
            RuntimeError::out_of_memory(format!(
                "failed to allocate buffer of {capacity} bytes"
            ))
        })?;
        data.push(0);

        Ok(Self { data })
    }

    /// Append raw bytes
    pub fn append(&mut self, bytes: &[u8]) -> Result<()> {
        self.ensure_room(bytes.len())?;

        self.data.pop();
        self.data.extend_from_slice(bytes);
        self.data.push(0);
        Ok(())
    }

    /// Append UTF-8 text
    #[inline]
    pub fn append_text(&mut self, text: &str) -> Result<()> {
        self.append(text.as_bytes())
    }

    /// Append formatted text, growing once to the probed length
    pub fn append_fmt(&mut self, args: fmt::Arguments<'_>) -> Result<()> {
        let mut probe = LenProbe { len: 0 };
        fmt::write(&mut probe, args)
            .map_err(|_| RuntimeError::invalid_argument("invalid format arguments".to_string()))?;

        self.ensure_room(probe.len)?;

        let content_len = self.len();
        self.data.pop();
        let write_result = fmt::write(&mut ByteSink(&mut self.data), args);
        if write_result.is_err() {
            // A Display impl failed mid-write; put the buffer back
            self.data.truncate(content_len);
            self.data.push(0);
            return Err(RuntimeError::invalid_argument(
                "format arguments failed while writing".to_string(),
            ));
        }
        self.data.push(0);
        Ok(())
    }

    /// Content as text (lossy for non-UTF-8 bytes)
    pub fn as_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.as_bytes())
    }

    /// Content bytes, terminator excluded
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.data.len() - 1]
    }

    /// Content bytes including the trailing terminator
    #[inline]
    pub fn terminated_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Logical content length, terminator excluded
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len() - 1
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current capacity of the backing storage
    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    /// Drop the content and rewrite the terminator, keeping capacity
    pub fn clear(&mut self) {
        self.data.clear();
        self.data.push(0);
    }

    /// Grow (doubling) until `extra` more content bytes plus the
    /// terminator fit; a failure changes nothing
    fn ensure_room(&mut self, extra: usize) -> Result<()> {
        let required = self
            .len()
            .checked_add(extra)
            .and_then(|n| n.checked_add(1))
            .ok_or_else(|| {
                RuntimeError::overflow(format!("append of {extra} bytes overflows"))
            })?;

        if required <= self.capacity() {
            return Ok(());
        }

        let mut new_capacity = self.capacity();
        while new_capacity < required {
            new_capacity = new_capacity.checked_mul(2).ok_or_else(|| {
                RuntimeError::overflow("buffer capacity doubling overflows".to_string())
            })?;
        }

        self.data
            .try_reserve_exact(new_capacity - self.data.len())
            .map_err(|_| {
                RuntimeError::out_of_memory(format!(
                    "failed to grow buffer to {new_capacity} bytes"
                ))
            })
    }
}

impl fmt::Display for StrBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl fmt::Debug for StrBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrBuf")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish()
    }
}

/// Counting sink for the formatted-length dry run
struct LenProbe {
    len: usize,
}

impl fmt::Write for LenProbe {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.len += s.len();
        Ok(())
    }
}

/// Appends formatted bytes straight into the backing vector
struct ByteSink<'a>(&'a mut Vec<u8>);

impl fmt::Write for ByteSink<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.extend_from_slice(s.as_bytes());
        Ok(())
    }
}
