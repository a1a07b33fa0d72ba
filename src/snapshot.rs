//! The `(previous, current, changeset)` triple published by a
//! [`crate::array::MutableObservableArray`] whenever it is mutated.

use crate::changeset::Changeset;

/// A published view of a collection's data at two points in time, plus
/// the [`Changeset`] describing how it got from one to the other.
///
/// `previous` is `None` only for the very first [`Snapshot`] a subscriber
/// receives, emitted synchronously at subscription time.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<C> {
    /// The collection's contents before `changeset` applied, or `None`
    /// for the initial snapshot.
    pub previous: Option<C>,
    /// The collection's contents after `changeset` applied.
    pub current: C,
    /// The edit script taking `previous` (or, for the initial snapshot,
    /// the empty sequence) to `current`.
    pub changeset: Changeset,
}

impl<C> Snapshot<C> {
    /// Returns a new [`Snapshot`] with an explicit `previous`.
    #[must_use]
    pub fn new(previous: C, current: C, changeset: Changeset) -> Self {
        Self {
            previous: Some(previous),
            current,
            changeset,
        }
    }

    /// Returns the initial [`Snapshot`] a fresh subscriber receives:
    /// `previous = None` and `changeset` reporting every element of
    /// `current` as inserted.
    #[must_use]
    pub fn initial(current: C, count: u32) -> Self {
        Self {
            previous: None,
            current,
            changeset: Changeset::initial(count),
        }
    }
}
