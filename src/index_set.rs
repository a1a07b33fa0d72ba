//! Sorted set of non-negative integer offsets, stored as a union of
//! disjoint, non-adjacent half-open ranges.

use std::ops::Range;

/// Zero-based position of an element within a sequence.
///
/// Offsets are not indices of an arbitrary caller collection — callers
/// convert their own addressing scheme to and from [`Offset`] before
/// entering this crate.
pub type Offset = u32;

/// A sorted set of [`Offset`]s, exposed as its smallest covering set of
/// disjoint, ascending, half-open ranges.
///
/// Two stored ranges are never adjacent or overlapping: inserting `5`
/// into a set already containing `{0..4}` yields `{0..6}`, not
/// `{0..4, 5..6}`.
#[derive(Debug, Clone, Default, Eq)]
pub struct IndexSet {
    ranges: Vec<Range<Offset>>,
}

impl PartialEq for IndexSet {
    fn eq(&self, other: &Self) -> bool {
        self.ranges == other.ranges
    }
}

impl IndexSet {
    /// Returns a new, empty [`IndexSet`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a set containing every offset in `0..count`.
    #[must_use]
    pub fn full_range(count: Offset) -> Self {
        if count == 0 {
            Self::new()
        } else {
            Self {
                ranges: vec![0..count],
            }
        }
    }

    /// Returns `true` if this set contains no offsets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Returns the total number of offsets contained in this set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ranges.iter().map(|r| (r.end - r.start) as usize).sum()
    }

    /// The smallest set of disjoint, ascending, half-open ranges covering
    /// this set.
    #[must_use]
    pub fn ranges(&self) -> &[Range<Offset>] {
        &self.ranges
    }

    /// The same ranges as [`IndexSet::ranges`], in descending order.
    pub fn reversed_ranges(&self) -> impl Iterator<Item = Range<Offset>> + '_ {
        self.ranges.iter().rev().cloned()
    }

    /// Returns an iterator over every offset contained in this set, in
    /// ascending order.
    pub fn iter(&self) -> impl Iterator<Item = Offset> + '_ {
        self.ranges.iter().flat_map(|r| r.clone())
    }

    /// Returns `true` if `offset` is a member of this set.
    #[must_use]
    pub fn contains(&self, offset: Offset) -> bool {
        self.find_range_index(offset).is_some()
    }

    /// Returns the index of the stored range containing `offset`, if any.
    fn find_range_index(&self, offset: Offset) -> Option<usize> {
        match self.ranges.binary_search_by(|r| {
            if offset < r.start {
                std::cmp::Ordering::Greater
            } else if offset >= r.end {
                std::cmp::Ordering::Less
            } else {
                std::cmp::Ordering::Equal
            }
        }) {
            Ok(index) => Some(index),
            Err(_) => None,
        }
    }

    /// Returns the number of members of this set that fall within `range`.
    ///
    /// Runs in `O(log n)` in the number of stored ranges.
    #[must_use]
    pub fn count_in(&self, range: Range<Offset>) -> usize {
        if range.start >= range.end {
            return 0;
        }
        let start_pos = self.lower_bound(range.start);
        let mut total = 0usize;
        for stored in &self.ranges[start_pos..] {
            if stored.start >= range.end {
                break;
            }
            let lo = stored.start.max(range.start);
            let hi = stored.end.min(range.end);
            if hi > lo {
                total += (hi - lo) as usize;
            }
        }
        total
    }

    /// Index of the first stored range whose end is strictly greater than
    /// `offset` (i.e. the first range that could possibly contain or
    /// follow `offset`).
    fn lower_bound(&self, offset: Offset) -> usize {
        self.ranges.partition_point(|r| r.end <= offset)
    }

    /// Inserts a single `offset` into this set.
    pub fn insert(&mut self, offset: Offset) {
        self.insert_range(offset..offset + 1);
    }

    /// Inserts every offset in `range` into this set, merging with any
    /// overlapping or adjacent stored ranges.
    pub fn insert_range(&mut self, range: Range<Offset>) {
        if range.start >= range.end {
            return;
        }
        let start_pos = self
            .ranges
            .partition_point(|r| r.end < range.start);
        let end_pos = self
            .ranges
            .partition_point(|r| r.start <= range.end);

        let merged_start = self.ranges[start_pos..end_pos]
            .first()
            .map_or(range.start, |r| r.start.min(range.start));
        let merged_end = self.ranges[start_pos..end_pos]
            .last()
            .map_or(range.end, |r| r.end.max(range.end));

        self.ranges
            .splice(start_pos..end_pos, std::iter::once(merged_start..merged_end));
    }

    /// Removes a single `offset` from this set, if present.
    pub fn remove(&mut self, offset: Offset) {
        if let Some(idx) = self.find_range_index(offset) {
            let r = self.ranges[idx].clone();
            self.ranges.remove(idx);
            if r.start < offset {
                self.ranges.insert(idx, r.start..offset);
            }
            if offset + 1 < r.end {
                self.ranges.insert(
                    idx + usize::from(r.start < offset),
                    offset + 1..r.end,
                );
            }
        }
    }

    /// Returns the union of `self` and `other`.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let mut result = self.clone();
        for r in &other.ranges {
            result.insert_range(r.clone());
        }
        result
    }

    /// Returns the intersection of `self` and `other`.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        let mut result = Self::new();
        let (mut i, mut j) = (0, 0);
        while i < self.ranges.len() && j < other.ranges.len() {
            let a = &self.ranges[i];
            let b = &other.ranges[j];
            let lo = a.start.max(b.start);
            let hi = a.end.min(b.end);
            if lo < hi {
                result.insert_range(lo..hi);
            }
            if a.end < b.end {
                i += 1;
            } else {
                j += 1;
            }
        }
        result
    }

    /// Returns `self` with every offset in `other` removed.
    #[must_use]
    pub fn subtracting(&self, other: &Self) -> Self {
        let mut result = self.clone();
        for offset in other.iter() {
            result.remove(offset);
        }
        result
    }

    /// Shifts every member of this set that is `>= from` by `delta`
    /// (which may be negative). Used internally by the staging view to
    /// keep its insert-tracking set in sync with buffer growth or
    /// shrinkage caused by later edits in the same batch.
    pub(crate) fn shift_from(&mut self, from: Offset, delta: i64) {
        if delta == 0 {
            return;
        }
        let unaffected_pos = self.ranges.partition_point(|r| r.end <= from);
        let mut shifted: Vec<Range<Offset>> = Vec::new();
        for r in self.ranges.drain(unaffected_pos..) {
            let shift = |o: Offset| -> Offset {
                if o < from {
                    o
                } else {
                    (i64::from(o) + delta).max(0) as Offset
                }
            };
            let new_start = shift(r.start);
            let new_end = shift(r.end);
            if new_end > new_start {
                shifted.push(new_start..new_end);
            }
        }
        for r in shifted {
            self.insert_range(r);
        }
    }
}

impl FromIterator<Offset> for IndexSet {
    fn from_iter<I: IntoIterator<Item = Offset>>(iter: I) -> Self {
        let mut set = Self::new();
        for offset in iter {
            set.insert(offset);
        }
        set
    }
}

impl FromIterator<Range<Offset>> for IndexSet {
    fn from_iter<I: IntoIterator<Item = Range<Offset>>>(iter: I) -> Self {
        let mut set = Self::new();
        for range in iter {
            set.insert_range(range);
        }
        set
    }
}
