//! The staging view a [`super::MutableObservableArray`] hands to the
//! closure passed to `modify`: a plain buffer plus per-position
//! provenance tracking that, together, become the published [`Changeset`]
//! when the batch commits.

use std::ops::Range;

use crate::changeset::{Changeset, Move};
use crate::index_set::{IndexSet, Offset};

/// A mutable ordered sequence that records, as you edit it, enough
/// provenance to synthesise the net [`Changeset`] those edits amount to,
/// per spec.md §4.4.
///
/// Every edit method is expressed in terms of [`StagingVec::replace`],
/// the sole primitive that touches the bookkeeping; this mirrors
/// spec.md's own description of the edit vocabulary as sugar over one
/// `replace(range, items)` contract.
///
/// Rather than accumulating `inserts`/`removals`/`mutations` directly as
/// edits come in (which would need every earlier entry re-shifted by
/// every later edit that lands before it — see DESIGN.md for the bug
/// that shape had), each buffer position instead carries its own
/// provenance: which `previous` offset it traces back to, if any, and
/// whether it has been overwritten since. The changeset is derived from
/// that provenance in one pass at [`StagingVec::finish`], once every
/// edit's positional effects are already baked into the buffer.
pub struct StagingVec<T> {
    buffer: Vec<T>,
    /// `origins[i]` is `Some(p)` if `buffer[i]` traces back to
    /// `previous[p]`, or `None` if it was inserted during this batch.
    origins: Vec<Option<Offset>>,
    /// `mutated[i]` records whether `buffer[i]` was overwritten by a
    /// `replace` call since the batch began. Meaningless where
    /// `origins[i]` is `None`.
    mutated: Vec<bool>,
    previous_len: Offset,
}

impl<T> StagingVec<T> {
    /// Seeds a staging view with the array's current contents and no
    /// accumulated edits.
    pub(super) fn new(initial: Vec<T>) -> Self {
        let previous_len = initial.len() as Offset;
        Self {
            origins: (0..previous_len).map(Some).collect(),
            mutated: vec![false; initial.len()],
            buffer: initial,
            previous_len,
        }
    }

    /// Consumes the staging view, returning its final buffer and the
    /// [`Changeset`] its edits amount to.
    ///
    /// For each final position `i` with provenance `origins[i]`:
    /// - `None` means the position was inserted this batch — recorded in
    ///   `inserts` at offset `i` (the current frame).
    /// - `Some(p) == i` means the element neither moved nor changed
    ///   frame; if it was overwritten, that is a `mutations` entry at
    ///   offset `i`, position-invariant by construction.
    /// - `Some(p) != i` means surrounding inserts/removals shifted this
    ///   surviving element's position. The staging API has no primitive
    ///   that reorders elements relative to one another, so such a shift
    ///   is always fully explained by those surrounding edits and needs
    ///   no move record — *unless* the element was also overwritten, in
    ///   which case a plain `mutations` entry would be read at the wrong
    ///   offset in one of the two frames (see DESIGN.md), so it is
    ///   emitted as an explicit `Move { is_mutated: true }` instead,
    ///   mirroring how the diff engine handles a moved-and-mutated pair.
    ///
    /// Offsets of `previous` never seen as a surviving origin are the
    /// `removals`.
    pub(super) fn finish(self) -> (Vec<T>, Changeset) {
        let mut inserts = IndexSet::new();
        let mut mutations = IndexSet::new();
        let mut moves = Vec::new();
        let mut present = IndexSet::new();

        for (index, origin) in self.origins.iter().enumerate() {
            let i = index as Offset;
            match *origin {
                None => inserts.insert(i),
                Some(p) => {
                    present.insert(p);
                    let is_mutated = self.mutated[index];
                    if p == i {
                        if is_mutated {
                            mutations.insert(i);
                        }
                    } else if is_mutated {
                        moves.push(Move::new(p, i, true));
                    }
                }
            }
        }

        let removals = IndexSet::full_range(self.previous_len).subtracting(&present);

        (
            self.buffer,
            Changeset {
                inserts,
                removals,
                mutations,
                moves,
            },
        )
    }

    /// The number of elements currently in the staging buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns `true` if the staging buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Returns a reference to the element currently at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.buffer.get(index)
    }

    /// Iterates the staging buffer's current contents, in order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.buffer.iter()
    }

    /// Replaces `range` of the staging buffer with `items`, the sole
    /// primitive every other edit method is expressed in terms of.
    ///
    /// The overlap between the old and new images (the first
    /// `min(range.len(), items.len())` positions of `range`) keeps its
    /// provenance and is marked overwritten; any excess-in-old positions
    /// are dropped along with their provenance (becoming removals, or
    /// cancelling an uncommitted insert, once [`StagingVec::finish`]
    /// reconciles provenance against the final buffer); any
    /// excess-in-new positions are freshly inserted with no provenance.
    pub fn replace(&mut self, range: Range<usize>, items: Vec<T>) {
        assert!(range.start <= range.end && range.end <= self.buffer.len(),
            "replace range {:?} out of bounds for a buffer of length {}", range, self.buffer.len());

        let old_count = range.end - range.start;
        let new_count = items.len();
        let overlap = old_count.min(new_count);

        for i in range.start..range.start + overlap {
            self.mutated[i] = true;
        }

        let mut new_origins: Vec<Option<Offset>> =
            self.origins[range.start..range.start + overlap].to_vec();
        new_origins.resize(new_count, None);
        let mut new_mutated: Vec<bool> = self.mutated[range.start..range.start + overlap].to_vec();
        new_mutated.resize(new_count, false);

        self.origins.splice(range.clone(), new_origins);
        self.mutated.splice(range.clone(), new_mutated);
        self.buffer.splice(range, items);
    }

    /// Overwrites the element at `index` in place.
    pub fn set(&mut self, index: usize, item: T) {
        self.replace(index..index + 1, vec![item]);
    }

    /// Inserts `item` at `index`, shifting everything at or after it.
    pub fn insert(&mut self, index: usize, item: T) {
        self.replace(index..index, vec![item]);
    }

    /// Inserts every element of `items` starting at `index`.
    pub fn insert_range(&mut self, index: usize, items: Vec<T>) {
        self.replace(index..index, items);
    }

    /// Appends `item` to the end of the staging buffer.
    pub fn append(&mut self, item: T) {
        let at = self.len();
        self.insert(at, item);
    }

    /// Appends every element of `items` to the end of the staging buffer.
    pub fn append_range(&mut self, items: Vec<T>) {
        let at = self.len();
        self.insert_range(at, items);
    }

    /// Removes the element at `index`.
    pub fn remove(&mut self, index: usize) {
        self.replace(index..index + 1, Vec::new());
    }

    /// Removes every element in `range`.
    pub fn remove_range(&mut self, range: Range<usize>) {
        self.replace(range, Vec::new());
    }

    /// Removes the first `n` elements.
    pub fn remove_first(&mut self, n: usize) {
        self.replace(0..n, Vec::new());
    }

    /// Removes the last `n` elements.
    pub fn remove_last(&mut self, n: usize) {
        let len = self.len();
        self.replace(len - n..len, Vec::new());
    }

    /// Replaces the staging buffer wholesale: every current element is
    /// removed and `items` is appended in its place.
    ///
    /// Expressed as `remove_range(0..len)` followed by `append_range`
    /// rather than a dedicated commit path — see DESIGN.md for why this
    /// is the only self-consistent reading of spec.md §4.4's "reset"
    /// clause once `removals` already covers the whole previous range.
    pub fn reset(&mut self, items: Vec<T>) {
        self.remove_range(0..self.len());
        self.append_range(items);
    }

    /// Removes every element, leaving the staging buffer empty.
    pub fn remove_all(&mut self) {
        self.remove_range(0..self.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_insert_then_remove_shifts_removal_to_pre_insert_frame() {
        // spec.md §8 scenario 6: on [1, 2, 3], insert 100 at index 1, then
        // remove index 3. Expected: previous=[1,2,3], current=[1,100,2],
        // changeset(inserts={1}, removals={2}) — the uncommitted insert at
        // 1 shifts the later removal to original-frame offset 2.
        let mut staging = StagingVec::new(vec![1, 2, 3]);
        staging.insert(1, 100);
        assert_eq!(staging.iter().copied().collect::<Vec<_>>(), vec![1, 100, 2, 3]);
        staging.remove(3);

        let (buffer, changeset) = staging.finish();
        assert_eq!(buffer, vec![1, 100, 2]);
        assert_eq!(changeset.inserts.iter().collect::<Vec<_>>(), vec![1]);
        assert_eq!(changeset.removals.iter().collect::<Vec<_>>(), vec![2]);
        assert!(changeset.mutations.is_empty());
    }

    #[test]
    fn append_range_is_all_inserts() {
        let mut staging = StagingVec::new(vec![1, 2]);
        staging.append_range(vec![3, 4]);
        let (buffer, changeset) = staging.finish();
        assert_eq!(buffer, vec![1, 2, 3, 4]);
        assert_eq!(changeset.inserts.iter().collect::<Vec<_>>(), vec![2, 3]);
    }

    #[test]
    fn set_records_a_single_mutation() {
        let mut staging = StagingVec::new(vec![1, 2, 3]);
        staging.set(1, 20);
        let (buffer, changeset) = staging.finish();
        assert_eq!(buffer, vec![1, 20, 3]);
        assert_eq!(changeset.mutations.iter().collect::<Vec<_>>(), vec![1]);
        assert!(changeset.inserts.is_empty());
        assert!(changeset.removals.is_empty());
    }

    #[test]
    fn remove_range_records_removals_in_original_frame() {
        let mut staging = StagingVec::new(vec![1, 2, 3, 4, 5]);
        staging.remove_range(1..3);
        let (buffer, changeset) = staging.finish();
        assert_eq!(buffer, vec![1, 4, 5]);
        assert_eq!(changeset.removals.iter().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn cancelling_an_uncommitted_insert_leaves_no_trace() {
        let mut staging = StagingVec::new(vec![1, 2]);
        staging.insert(1, 100);
        staging.remove(1);
        let (buffer, changeset) = staging.finish();
        assert_eq!(buffer, vec![1, 2]);
        assert!(changeset.is_empty());
    }

    #[test]
    fn reset_replaces_everything_as_one_removal_and_one_insert_block() {
        let mut staging = StagingVec::new(vec![1, 2, 3]);
        staging.reset(vec![9, 8]);
        let (buffer, changeset) = staging.finish();
        assert_eq!(buffer, vec![9, 8]);
        assert_eq!(changeset.removals.ranges(), &[0..3]);
        assert_eq!(changeset.inserts.ranges(), &[0..2]);
        assert!(changeset.mutations.is_empty());
    }

    #[test]
    fn shrinking_replace_overlap_is_a_mutation_not_a_removal() {
        // Replacing 3 elements with 1: the first position overlaps (a
        // mutation), the remaining two are excess-in-old (removals).
        let mut staging = StagingVec::new(vec![1, 2, 3, 4]);
        staging.replace(1..4, vec![20]);
        let (buffer, changeset) = staging.finish();
        assert_eq!(buffer, vec![1, 20]);
        assert_eq!(changeset.mutations.iter().collect::<Vec<_>>(), vec![1]);
        assert_eq!(changeset.removals.iter().collect::<Vec<_>>(), vec![2, 3]);
    }

    #[test]
    fn growing_replace_overlap_is_entirely_mutations() {
        // Replacing 1 element with 3: the whole original range overlaps
        // (mutation), the two extra positions are inserts.
        let mut staging = StagingVec::new(vec![1, 2, 3]);
        staging.replace(1..2, vec![20, 21, 22]);
        let (buffer, changeset) = staging.finish();
        assert_eq!(buffer, vec![1, 20, 21, 22, 3]);
        assert_eq!(changeset.mutations.iter().collect::<Vec<_>>(), vec![1]);
        assert_eq!(changeset.inserts.iter().collect::<Vec<_>>(), vec![2, 3]);
    }

    #[test]
    fn unmutated_shift_after_insert_is_elided_not_a_move() {
        // A plain insert-at-front shifts every later element's raw
        // position, but none of them were touched, so no move or
        // mutation should appear for them — only the insert itself.
        let mut staging = StagingVec::new(vec![1, 2, 3]);
        staging.insert(0, 99);
        let (buffer, changeset) = staging.finish();
        assert_eq!(buffer, vec![99, 1, 2, 3]);
        assert_eq!(changeset.inserts.iter().collect::<Vec<_>>(), vec![0]);
        assert!(changeset.removals.is_empty());
        assert!(changeset.mutations.is_empty());
        assert!(changeset.moves.is_empty());
    }

    #[test]
    fn mutation_shifted_by_an_earlier_insert_becomes_a_move() {
        // spec.md §3's mutation frame requires the same offset to index
        // the element in both the untouched `previous` and the final
        // `current`. An insert before a later `set` shifts that element's
        // final position away from its `previous` position, so it can no
        // longer be a plain `mutations` entry without reproduce::apply
        // reading the wrong offset — it must be an explicit mutated move.
        let mut staging = StagingVec::new(vec![10, 20, 30]);
        staging.insert(0, 99);
        staging.set(2, 77);
        let (buffer, changeset) = staging.finish();
        assert_eq!(buffer, vec![99, 10, 77, 30]);
        assert_eq!(changeset.inserts.iter().collect::<Vec<_>>(), vec![0]);
        assert!(changeset.mutations.is_empty());
        assert_eq!(changeset.moves, vec![Move::new(1, 2, true)]);

        let previous = [10, 20, 30];
        let reproduced = crate::reproduce::apply(&previous, &buffer, &changeset, |a: &i32, b: &i32| a == b);
        assert_eq!(reproduced, buffer);
    }
}
