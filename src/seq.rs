//! Sequence indexing - negative-index and slice normalization
//!
//! Design: Pure functions, no state and no allocation. Every component
//! exposing positional or ranged access funnels its bounds handling
//! through here, so the from-the-end and clamping rules live in exactly
//! one place.
//!
//! The slicing contract is stop-exclusive and direction-aware: a
//! normalized slice records a concrete starting offset, a bound, the
//! step magnitude, and exactly how many elements an iteration yields.

use crate::error::{Result, RuntimeError};

/// Resolve a possibly-negative index against a sequence length
///
/// Negative indices count from the end. Anything outside
/// `[-len, len - 1]` is out of range.
pub fn normalize_index(index: i64, len: usize) -> Result<usize> {
    let n = len as i64;
    let adjusted = if index < 0 { index + n } else { index };

    if adjusted < 0 || adjusted >= n {
        return Err(RuntimeError::index_out_of_range(format!(
            "index {index} out of range for length {len}"
        )));
    }

    Ok(adjusted as usize)
}

/// Slice parameters as written: each bound optional, possibly negative
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SliceSpec {
    pub start: Option<i64>,
    pub stop: Option<i64>,
    pub step: Option<i64>,
}

impl SliceSpec {
    /// The full-sequence slice (`[:]`)
    pub fn full() -> Self {
        Self::default()
    }

    /// Start and stop with the default step (`[start:stop]`)
    pub fn range(start: i64, stop: i64) -> Self {
        Self {
            start: Some(start),
            stop: Some(stop),
            step: None,
        }
    }

    /// All three parameters (`[start:stop:step]`)
    pub fn new(start: i64, stop: i64, step: i64) -> Self {
        Self {
            start: Some(start),
            stop: Some(stop),
            step: Some(step),
        }
    }
}

/// A slice resolved against a concrete sequence length
///
/// `start` and `stop` are clamped offsets; `stop` (and `start`, for an
/// empty slice) can be -1 when a descending iteration terminates before
/// index 0. `len` is authoritative: iterating yields exactly `len`
/// positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedSlice {
    pub start: isize,
    pub stop: isize,
    /// Step magnitude; direction is carried by `start` vs `stop`
    pub step: usize,
    pub len: usize,
}

impl NormalizedSlice {
    /// True when the iteration walks toward lower indices
    #[inline]
    pub fn is_descending(&self) -> bool {
        self.start > self.stop
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The concrete positions the slice visits, in iteration order
    pub fn indices(&self) -> SliceIndices {
        // Wrapping negation tolerates the extreme `i64::MIN` magnitude,
        // which can only occur for slices of at most one element
        let step = if self.is_descending() {
            0isize.wrapping_sub(self.step as isize)
        } else {
            self.step as isize
        };

        SliceIndices {
            next: self.start,
            step,
            remaining: self.len,
        }
    }
}

/// Resolve optional, possibly-negative slice parameters against a length
///
/// Explicit negative bounds count from the end and are clamped into
/// range afterwards. Omitted bounds become the direction's natural
/// endpoints directly - for a descending slice the natural stop is the
/// position before index 0, carried as -1 rather than re-interpreted as
/// from-the-end.
pub fn normalize_slice(spec: SliceSpec, len: usize) -> Result<NormalizedSlice> {
    if spec.step == Some(0) {
        return Err(RuntimeError::invalid_argument(
            "slice step cannot be zero".to_string(),
        ));
    }

    let step = spec.step.unwrap_or(1);
    let magnitude = step.unsigned_abs() as usize;
    let n = len as i64;

    let start = match spec.start {
        Some(value) => clamp_bound(value, n, step > 0),
        None if step > 0 => 0,
        None => n - 1,
    };

    let stop = match spec.stop {
        Some(value) => clamp_bound(value, n, step > 0),
        None if step > 0 => n,
        None => -1,
    };

    // Ceiling division over i128 so even `i64::MIN` steps cannot wrap
    let span = if step > 0 {
        stop as i128 - start as i128
    } else {
        start as i128 - stop as i128
    };
    let mag = magnitude as i128;
    let count = if span > 0 { (span + mag - 1) / mag } else { 0 };

    Ok(NormalizedSlice {
        start: start as isize,
        stop: stop as isize,
        step: magnitude,
        len: count as usize,
    })
}

/// Adjust one explicit bound: from-the-end if negative, then clamp to
/// the valid window for the iteration direction
fn clamp_bound(value: i64, n: i64, ascending: bool) -> i64 {
    let mut bound = if value < 0 { value + n } else { value };

    if bound < 0 {
        bound = if ascending { 0 } else { -1 };
    }
    if bound >= n {
        bound = if ascending { n } else { n - 1 };
    }

    bound
}

/// Iterator over the positions of a [`NormalizedSlice`]
#[derive(Debug, Clone)]
pub struct SliceIndices {
    next: isize,
    step: isize,
    remaining: usize,
}

impl Iterator for SliceIndices {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }

        // `remaining > 0` keeps `next` inside `[0, len)`; the saturating
        // advance past the final element is never read back
        let index = self.next as usize;
        self.next = self.next.saturating_add(self.step);
        self.remaining -= 1;
        Some(index)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for SliceIndices {}

impl std::iter::FusedIterator for SliceIndices {}

/// Checked counting range with an explicit step
///
/// The integer-iteration companion to slicing: start-inclusive,
/// stop-exclusive, stepping in either direction.
#[derive(Debug, Clone, Copy)]
pub struct StepRange {
    current: i64,
    stop: i64,
    step: i64,
}

impl StepRange {
    /// `0..stop` with step 1
    pub fn up_to(stop: i64) -> Self {
        Self {
            current: 0,
            stop,
            step: 1,
        }
    }

    /// `start..stop` with step 1
    pub fn span(start: i64, stop: i64) -> Self {
        Self {
            current: start,
            stop,
            step: 1,
        }
    }

    /// `start..stop` with an explicit nonzero step
    pub fn new(start: i64, stop: i64, step: i64) -> Result<Self> {
        if step == 0 {
            return Err(RuntimeError::invalid_argument(
                "range step must not be zero".to_string(),
            ));
        }

        Ok(Self {
            current: start,
            stop,
            step,
        })
    }
}

impl Iterator for StepRange {
    type Item = i64;

    fn next(&mut self) -> Option<i64> {
        let exhausted = if self.step > 0 {
            self.current >= self.stop
        } else {
            self.current <= self.stop
        };
        if exhausted {
            return None;
        }

        let value = self.current;
        match self.current.checked_add(self.step) {
            Some(next) => self.current = next,
            // Stepping past the representable range ends the iteration
            None => self.current = self.stop,
        }
        Some(value)
    }
}

impl std::iter::FusedIterator for StepRange {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use proptest::prelude::*;

    #[test]
    fn index_resolves_over_the_whole_valid_window() {
        for len in 0usize..=6 {
            let n = len as i64;
            for index in -n..n {
                let expected = if index >= 0 { index } else { index + n };
                assert_eq!(
                    normalize_index(index, len).expect("in-range index"),
                    expected as usize
                );
            }

            for index in [n, n + 1, -n - 1, i64::MIN / 2, i64::MAX / 2] {
                let err = normalize_index(index, len).expect_err("out-of-range index");
                assert_eq!(err.kind, ErrorKind::IndexOutOfRange);
            }
        }
    }

    #[test]
    fn index_zero_fails_on_empty_sequences() {
        let err = normalize_index(0, 0).expect_err("nothing to index");
        assert_eq!(err.kind, ErrorKind::IndexOutOfRange);
    }

    #[test]
    fn negative_start_with_open_stop() {
        let spec = SliceSpec {
            start: Some(-3),
            stop: None,
            step: Some(1),
        };
        let norm = normalize_slice(spec, 10).expect("slice");

        assert_eq!(norm.start, 7);
        assert_eq!(norm.stop, 10);
        assert_eq!(norm.step, 1);
        assert_eq!(norm.len, 3);
        assert_eq!(norm.indices().collect::<Vec<_>>(), vec![7, 8, 9]);
    }

    #[test]
    fn full_reverse_covers_everything() {
        let spec = SliceSpec {
            step: Some(-1),
            ..SliceSpec::full()
        };
        let norm = normalize_slice(spec, 5).expect("slice");

        assert_eq!(norm.start, 4);
        assert_eq!(norm.stop, -1);
        assert_eq!(norm.step, 1);
        assert_eq!(norm.len, 5);
        assert!(norm.is_descending());
        assert_eq!(norm.indices().collect::<Vec<_>>(), vec![4, 3, 2, 1, 0]);
    }

    #[test]
    fn zero_step_is_rejected() {
        let err = normalize_slice(SliceSpec::new(0, 5, 0), 10).expect_err("zero step");
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
    }

    #[test]
    fn bounds_clamp_to_the_sequence() {
        // Start far below, stop far above: the whole sequence
        let norm = normalize_slice(SliceSpec::range(-100, 100), 4).expect("slice");
        assert_eq!((norm.start, norm.stop, norm.len), (0, 4, 4));

        // Descending from far below the start: empty
        let spec = SliceSpec {
            start: Some(-10),
            stop: None,
            step: Some(-1),
        };
        let norm = normalize_slice(spec, 5).expect("slice");
        assert_eq!(norm.len, 0);
    }

    #[test]
    fn stride_lengths_match_ceiling_division() {
        let norm = normalize_slice(SliceSpec::new(1, 8, 3), 10).expect("slice");
        assert_eq!(norm.len, 3);
        assert_eq!(norm.indices().collect::<Vec<_>>(), vec![1, 4, 7]);

        let norm = normalize_slice(SliceSpec::new(8, 1, -2), 10).expect("slice");
        assert_eq!(norm.len, 4);
        assert_eq!(norm.indices().collect::<Vec<_>>(), vec![8, 6, 4, 2]);

        let spec = SliceSpec {
            start: None,
            stop: None,
            step: Some(2),
        };
        let norm = normalize_slice(spec, 10).expect("slice");
        assert_eq!(norm.len, 5);
    }

    #[test]
    fn normalization_is_idempotent_for_ascending_output() {
        for (spec, len) in [
            (SliceSpec::range(-3, 100), 10usize),
            (SliceSpec::new(1, 8, 3), 10),
            (SliceSpec::full(), 7),
            (SliceSpec::range(2, 2), 4),
        ] {
            let first = normalize_slice(spec, len).expect("first pass");
            let again = normalize_slice(
                SliceSpec::new(first.start as i64, first.stop as i64, first.step as i64),
                len,
            )
            .expect("second pass");
            assert_eq!(first, again);
        }
    }

    #[test]
    fn empty_ascending_window_has_no_indices() {
        let norm = normalize_slice(SliceSpec::range(5, 2), 8).expect("slice");
        assert_eq!(norm.len, 0);
        assert_eq!(norm.indices().count(), 0);
    }

    #[test]
    fn step_range_walks_both_directions() {
        assert_eq!(StepRange::up_to(5).collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);
        assert_eq!(StepRange::span(2, 5).collect::<Vec<_>>(), vec![2, 3, 4]);
        assert_eq!(
            StepRange::new(10, 0, -2).expect("range").collect::<Vec<_>>(),
            vec![10, 8, 6, 4, 2]
        );
        assert_eq!(StepRange::up_to(0).count(), 0);

        let err = StepRange::new(0, 5, 0).expect_err("zero step");
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
    }

    proptest! {
        #[test]
        fn slice_indices_stay_in_bounds(
            len in 0usize..64,
            start in proptest::option::of(-80i64..80),
            stop in proptest::option::of(-80i64..80),
            step in proptest::option::of((-5i64..=5).prop_filter("nonzero", |s| *s != 0)),
        ) {
            let norm = normalize_slice(SliceSpec { start, stop, step }, len).unwrap();
            let indices: Vec<usize> = norm.indices().collect();

            prop_assert_eq!(indices.len(), norm.len);
            for &i in &indices {
                prop_assert!(i < len);
            }

            // Strictly monotonic in the iteration direction
            for pair in indices.windows(2) {
                if norm.is_descending() {
                    prop_assert!(pair[0] > pair[1]);
                } else {
                    prop_assert!(pair[0] < pair[1]);
                }
            }

            // Consecutive visited positions differ by the step magnitude
            for pair in indices.windows(2) {
                let gap = pair[0].abs_diff(pair[1]);
                prop_assert_eq!(gap, norm.step);
            }
        }

        #[test]
        fn normalized_index_matches_direct_offsets(
            len in 1usize..64,
            index in -64i64..64,
        ) {
            let n = len as i64;
            let result = normalize_index(index, len);

            if (-n..n).contains(&index) {
                let expected = if index < 0 { index + n } else { index } as usize;
                prop_assert_eq!(result.unwrap(), expected);
            } else {
                prop_assert!(result.is_err());
            }
        }
    }
}
