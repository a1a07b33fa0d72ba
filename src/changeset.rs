//! The changeset value type: the minimal edit script a diff or a batch
//! of staged edits is reduced to.

use crate::index_set::{IndexSet, Offset};

/// An element that is present in both `previous` and `current`, but at a
/// different position, expressed as an offset pair in each sequence's own
/// frame.
///
/// `source` is in the `previous` frame (before any edit in the owning
/// [`Changeset`] applies); `destination` is in the `current` frame (after
/// every edit applies).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    /// Position of the element in `previous`.
    pub source: Offset,
    /// Position of the element in `current`.
    pub destination: Offset,
    /// Whether the element's value also changed, in addition to moving.
    pub is_mutated: bool,
}

impl Move {
    /// Returns a new [`Move`] between `source` and `destination`.
    #[must_use]
    pub fn new(source: Offset, destination: Offset, is_mutated: bool) -> Self {
        Self {
            source,
            destination,
            is_mutated,
        }
    }
}

/// A minimal description of how one ordered sequence becomes another:
/// insertions, removals, in-place mutations, and moves.
///
/// See the crate-level documentation for the reproducibility law this
/// type's fields must obey: applying a well-formed [`Changeset`] to
/// `previous` via [`crate::reproduce::apply`] must yield `current`, up to
/// caller-supplied equality.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Changeset {
    /// Offsets, in the `current` frame, of elements that did not exist in
    /// `previous`.
    pub inserts: IndexSet,
    /// Offsets, in the `previous` frame, of elements that do not exist in
    /// `current`.
    pub removals: IndexSet,
    /// Offsets, shared by both frames, of elements whose value changed
    /// but whose position did not.
    pub mutations: IndexSet,
    /// Elements present in both sequences at different positions,
    /// optionally also mutated.
    pub moves: Vec<Move>,
}

impl Changeset {
    /// Returns the empty changeset: no inserts, removals, mutations, or
    /// moves. Applying it to any `previous` is a no-op.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the changeset describing a collection's own initial
    /// snapshot: every element of `current` is reported as an insert, per
    /// spec.md §4.1.
    #[must_use]
    pub fn initial(count: Offset) -> Self {
        Self {
            inserts: IndexSet::full_range(count),
            ..Self::default()
        }
    }

    /// Returns a changeset with only `inserts` populated.
    #[must_use]
    pub fn inserting(inserts: IndexSet) -> Self {
        Self {
            inserts,
            ..Self::default()
        }
    }

    /// Returns a changeset with only `removals` populated.
    #[must_use]
    pub fn removing(removals: IndexSet) -> Self {
        Self {
            removals,
            ..Self::default()
        }
    }

    /// Returns a changeset with only `mutations` populated.
    #[must_use]
    pub fn mutating(mutations: IndexSet) -> Self {
        Self {
            mutations,
            ..Self::default()
        }
    }

    /// Returns `true` if this changeset describes no change at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inserts.is_empty()
            && self.removals.is_empty()
            && self.mutations.is_empty()
            && self.moves.is_empty()
    }

    /// Checks the disjointness invariants of spec.md §3: no offset is
    /// simultaneously a removal and a mutation, an insert and a
    /// mutation, or a move endpoint and an insert/removal at the
    /// respective side. Intended for tests and debug assertions, not for
    /// production hot paths.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        if !self.removals.intersection(&self.mutations).is_empty() {
            return false;
        }
        if !self.inserts.intersection(&self.mutations).is_empty() {
            return false;
        }
        for mv in &self.moves {
            if self.removals.contains(mv.source) {
                return false;
            }
            if self.inserts.contains(mv.destination) {
                return false;
            }
        }
        true
    }
}
