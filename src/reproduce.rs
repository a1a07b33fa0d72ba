//! The canonical reproducer: a reference implementation of what a
//! [`Changeset`] *means*, per spec.md §4.6.
//!
//! This is deliberately public, not just test-internal: it is both the
//! specification of changeset semantics and a convenience for any
//! consumer that wants to sanity-check a hand-assembled [`Changeset`]
//! against a known `previous`/`current` pair before trusting it.

use crate::changeset::Changeset;

/// Applies `changeset` to `previous`, producing the sequence it claims
/// `previous` becomes. `current` supplies the post-edit values for the
/// mutated, inserted, and move-destination positions `changeset`
/// references — it is not otherwise consulted.
///
/// In debug builds, asserts the result equals `current` under `eq`; this
/// is the reproducibility law from spec.md §3/§8, and a caller passing a
/// changeset that violates it has a bug in changeset construction, not
/// in this function.
pub fn apply<T, E>(previous: &[T], current: &[T], changeset: &Changeset, eq: E) -> Vec<T>
where
    T: Clone,
    E: Fn(&T, &T) -> bool,
{
    let mut values: Vec<T> = previous.to_vec();

    // 1. Copy mutations: overlapping positions keep their index, but take
    // their value from `current`.
    for range in changeset.mutations.ranges() {
        let (start, end) = (range.start as usize, range.end as usize);
        values[start..end].clone_from_slice(&current[start..end]);
    }

    // 2. Remove `removals ∪ move-sources`, ranges in reverse so earlier
    // removals don't invalidate later offsets.
    let removal_sources: crate::index_set::IndexSet = changeset
        .removals
        .union(&changeset.moves.iter().map(|m| m.source).collect());
    for range in removal_sources.reversed_ranges() {
        values.drain(range.start as usize..range.end as usize);
    }

    // 3. Insert `inserts ∪ move-destinations`, ranges forward, pulling the
    // corresponding slice out of `current`.
    let insert_destinations: crate::index_set::IndexSet = changeset
        .inserts
        .union(&changeset.moves.iter().map(|m| m.destination).collect());
    for range in insert_destinations.ranges() {
        let (start, end) = (range.start as usize, range.end as usize);
        for (offset, value) in (start..end).zip(current[start..end].iter().cloned()) {
            values.insert(offset, value);
        }
    }

    debug_assert!(
        values.len() == current.len() && values.iter().zip(current).all(|(a, b)| eq(a, b)),
        "reproduce::apply did not reproduce `current` — the changeset is not well-formed"
    );

    values
}
