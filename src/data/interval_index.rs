// ============================================================
// Layer 4 — Interval Index
// ============================================================
// Answers one question, many times: "does any labelled range
// overlap the half-open character range [start, end)?"
//
// The ranges are known up front and never change, so instead of
// a balanced tree we keep them sorted by start and store, for
// every prefix of that order, the largest end seen so far:
//
//   ranges:   [0,20)  [21,24)  [25,27)
//   max_end:    20       24       27
//
// Query [s, e):
//   1. binary search for the first range whose start >= e
//      (everything before it starts early enough to overlap)
//   2. among those, some range overlaps iff max_end > s
//
// Both steps are O(log n) / O(1).
//
// Reference: Rust Book §8 (Vectors)
//            std slice::partition_point

use crate::domain::error::RangeError;

#[derive(Debug, Clone, Default)]
pub struct IntervalIndex {
    /// (start, end) pairs sorted by start
    intervals: Vec<(usize, usize)>,
    /// max_end[i] = max(end of intervals[0..=i])
    max_end: Vec<usize>,
}

impl IntervalIndex {
    /// Build an index over ranges of a document with `doc_len` characters.
    ///
    /// Zero-length ranges are dropped: they mark nothing.
    /// Inverted or out-of-bounds ranges are rejected, never clamped.
    pub fn build<I>(ranges: I, doc_len: usize) -> Result<Self, RangeError>
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let mut intervals = Vec::new();

        for (start, end) in ranges {
            if start > end {
                return Err(RangeError::Inverted { start, end });
            }
            if end > doc_len {
                return Err(RangeError::OutOfBounds { start, end, len: doc_len });
            }
            if start == end {
                continue;
            }
            intervals.push((start, end));
        }

        intervals.sort_unstable();

        let max_end = intervals
            .iter()
            .scan(0usize, |best, &(_, end)| {
                *best = (*best).max(end);
                Some(*best)
            })
            .collect();

        Ok(Self { intervals, max_end })
    }

    /// True when some indexed range shares at least one character with [start, end).
    /// An empty query never overlaps anything.
    pub fn overlaps(&self, start: usize, end: usize) -> bool {
        if start >= end {
            return false;
        }
        let candidates = self.intervals.partition_point(|&(s, _)| s < end);
        candidates > 0 && self.max_end[candidates - 1] > start
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn index(ranges: &[(usize, usize)]) -> IntervalIndex {
        IntervalIndex::build(ranges.iter().copied(), 100).unwrap()
    }

    #[test]
    fn test_overlap_is_half_open() {
        let idx = index(&[(10, 20)]);
        assert!(idx.overlaps(19, 25));
        assert!(idx.overlaps(5, 11));
        assert!(idx.overlaps(12, 14));
        // touching at the boundary is not an overlap
        assert!(!idx.overlaps(20, 25));
        assert!(!idx.overlaps(5, 10));
    }

    #[test]
    fn test_query_between_ranges() {
        let idx = index(&[(0, 20), (21, 24), (25, 27)]);
        assert!(!idx.overlaps(20, 21));
        assert!(!idx.overlaps(24, 25));
        assert!(idx.overlaps(23, 26));
    }

    #[test]
    fn test_empty_query_never_overlaps() {
        let idx = index(&[(0, 50)]);
        assert!(!idx.overlaps(10, 10));
        assert!(!idx.overlaps(0, 0));
    }

    #[test]
    fn test_zero_length_ranges_are_dropped() {
        let idx = index(&[(5, 5), (7, 7)]);
        assert!(idx.is_empty());
        assert!(!idx.overlaps(0, 100));
    }

    #[test]
    fn test_unsorted_input_is_accepted() {
        let idx = index(&[(50, 60), (0, 10)]);
        assert_eq!(idx.len(), 2);
        assert!(idx.overlaps(55, 56));
        assert!(idx.overlaps(9, 12));
        assert!(!idx.overlaps(10, 50));
    }

    #[test]
    fn test_long_range_is_found_behind_short_ones() {
        // [0,90) dominates; later short ranges must not hide it
        let idx = index(&[(0, 90), (10, 12), (30, 31)]);
        assert!(idx.overlaps(60, 61));
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let err = IntervalIndex::build([(8, 3)], 100).unwrap_err();
        assert_eq!(err, RangeError::Inverted { start: 8, end: 3 });
    }

    #[test]
    fn test_out_of_bounds_range_is_rejected() {
        let err = IntervalIndex::build([(0, 5), (26, 28)], 27).unwrap_err();
        assert_eq!(err, RangeError::OutOfBounds { start: 26, end: 28, len: 27 });
    }

    #[test]
    fn test_range_ending_at_document_end_is_valid() {
        assert!(IntervalIndex::build([(25, 27)], 27).is_ok());
    }

    proptest! {
        #[test]
        fn overlaps_matches_brute_force(
            ranges in proptest::collection::vec((0usize..60, 0usize..20), 0..12),
            start in 0usize..80,
            width in 0usize..15,
        ) {
            let ranges: Vec<(usize, usize)> = ranges
                .into_iter()
                .map(|(s, w)| (s, s + w))
                .collect();
            let idx = IntervalIndex::build(ranges.iter().copied(), 80).unwrap();
            let end = start + width;

            let expected = start < end
                && ranges.iter().any(|&(s, e)| s < e && s < end && e > start);
            prop_assert_eq!(idx.overlaps(start, end), expected);
        }
    }
}
