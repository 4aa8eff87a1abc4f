//! Sequence indexing - C API for index and slice normalization

use crate::error::RuntimeError;
use crate::seq::{self, SliceSpec};

/// Slice parameters as C code carries them: values plus presence flags
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RawSliceSpec {
    pub start: i64,
    pub stop: i64,
    pub step: i64,
    pub has_start: bool,
    pub has_stop: bool,
    pub has_step: bool,
}

impl From<RawSliceSpec> for SliceSpec {
    fn from(raw: RawSliceSpec) -> Self {
        Self {
            start: raw.has_start.then_some(raw.start),
            stop: raw.has_stop.then_some(raw.stop),
            step: raw.has_step.then_some(raw.step),
        }
    }
}

/// Normalized slice as handed back to C code
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RawNormalizedSlice {
    pub start: isize,
    pub stop: isize,
    /// Step magnitude; direction is `start` vs `stop`
    pub step: usize,
    pub len: usize,
}

/// The fully-open slice (`[:]`)
#[no_mangle]
pub extern "C" fn pyrite_slice_new() -> RawSliceSpec {
    RawSliceSpec {
        start: 0,
        stop: 0,
        step: 1,
        has_start: false,
        has_stop: false,
        has_step: false,
    }
}

/// Start and stop with the default step (`[start:stop]`)
#[no_mangle]
pub extern "C" fn pyrite_slice_range(start: i64, stop: i64) -> RawSliceSpec {
    RawSliceSpec {
        start,
        stop,
        step: 1,
        has_start: true,
        has_stop: true,
        has_step: false,
    }
}

/// All three parameters (`[start:stop:step]`)
#[no_mangle]
pub extern "C" fn pyrite_slice_full(start: i64, stop: i64, step: i64) -> RawSliceSpec {
    RawSliceSpec {
        start,
        stop,
        step,
        has_start: true,
        has_stop: true,
        has_step: true,
    }
}

/// Resolve a possibly-negative index; writes the offset to `out`
///
/// Returns 0 on success, a kind code otherwise (`out` untouched on
/// failure).
///
/// # Safety
/// `out` must be null (rejected) or writable.
#[no_mangle]
pub unsafe extern "C" fn pyrite_normalize_index(index: i64, len: usize, out: *mut usize) -> i32 {
    let Some(out) = out.as_mut() else {
        return RuntimeError::invalid_argument("index output is null".to_string())
            .kind
            .code();
    };

    match seq::normalize_index(index, len) {
        Ok(offset) => {
            *out = offset;
            0
        }
        Err(err) => err.kind.code(),
    }
}

/// Resolve slice parameters against `len`; writes the result to `out`
///
/// Returns 0 on success, a kind code otherwise (`out` untouched on
/// failure).
///
/// # Safety
/// `spec` must be null (rejected) or readable; `out` must be null
/// (rejected) or writable.
#[no_mangle]
pub unsafe extern "C" fn pyrite_normalize_slice(
    spec: *const RawSliceSpec,
    len: usize,
    out: *mut RawNormalizedSlice,
) -> i32 {
    let Some(spec) = spec.as_ref() else {
        return RuntimeError::invalid_argument("slice spec is null".to_string())
            .kind
            .code();
    };
    let Some(out) = out.as_mut() else {
        return RuntimeError::invalid_argument("slice output is null".to_string())
            .kind
            .code();
    };

    match seq::normalize_slice(SliceSpec::from(*spec), len) {
        Ok(norm) => {
            *out = RawNormalizedSlice {
                start: norm.start,
                stop: norm.stop,
                step: norm.step,
                len: norm.len,
            };
            0
        }
        Err(err) => err.kind.code(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn index_roundtrip_through_the_c_shapes() {
        unsafe {
            let mut out = 0usize;
            assert_eq!(pyrite_normalize_index(-3, 10, &mut out), 0);
            assert_eq!(out, 7);

            assert_eq!(
                pyrite_normalize_index(10, 10, &mut out),
                ErrorKind::IndexOutOfRange.code()
            );
            // Output untouched by the failed call
            assert_eq!(out, 7);
        }
    }

    #[test]
    fn slice_roundtrip_through_the_c_shapes() {
        unsafe {
            let mut spec = pyrite_slice_new();
            spec.has_step = true;
            spec.step = -1;

            let mut out = RawNormalizedSlice {
                start: 0,
                stop: 0,
                step: 0,
                len: 0,
            };
            assert_eq!(pyrite_normalize_slice(&spec, 5, &mut out), 0);
            assert_eq!((out.start, out.stop, out.step, out.len), (4, -1, 1, 5));

            let zero_step = pyrite_slice_full(0, 5, 0);
            assert_eq!(
                pyrite_normalize_slice(&zero_step, 5, &mut out),
                ErrorKind::InvalidArgument.code()
            );
        }
    }

    #[test]
    fn constructors_mirror_the_written_forms() {
        let range = pyrite_slice_range(2, 8);
        assert!(range.has_start && range.has_stop && !range.has_step);

        let full = pyrite_slice_full(1, 9, 2);
        assert!(full.has_step);
        assert_eq!(SliceSpec::from(full), SliceSpec::new(1, 9, 2));
    }
}
