//! Pure diffing between two sequences: Paul Heckel's symbol-table
//! algorithm with move detection, as specified in spec.md §4.3.

use std::collections::HashMap;
use std::hash::Hash;

use crate::changeset::{Changeset, Move};
use crate::index_set::{IndexSet, Offset};

/// Per-identity bookkeeping built up during passes 1 and 2.
#[derive(Default)]
struct Entry {
    occurrences_in_new: u32,
    occurrences_in_old: u32,
    location_in_old: Option<Offset>,
}

/// A slot in the `newRefs`/`oldRefs` parallel arrays: either still
/// pointing at a shared symbol-table entry, or anchored to a concrete
/// offset in the other sequence.
#[derive(Clone, Copy)]
enum Slot {
    Table(usize),
    Remote(Offset),
}

/// Computes a well-formed [`Changeset`] taking `previous` to `current`.
///
/// `identify` maps an element to the hashable key used to recognise the
/// "same" element across both sequences; `equal` decides whether a
/// recognised element has mutated (`equal` may be strictly finer than
/// `identify`, e.g. identity by id, equality by full contents). Applying
/// the returned changeset to `previous` via [`crate::reproduce::apply`]
/// reproduces `current` under `equal`.
///
/// Runs in expected `O(n + m)` time and `O(n + m)` space, where `n` and
/// `m` are the lengths of `previous` and `current`. The symbol table
/// built here is stack-local to this call; nothing is shared across
/// calls.
pub fn diff<T, K, I, E>(previous: &[T], current: &[T], identify: I, equal: E) -> Changeset
where
    K: Eq + Hash,
    I: Fn(&T) -> K,
    E: Fn(&T, &T) -> bool,
{
    let mut table: HashMap<K, usize> = HashMap::new();
    let mut entries: Vec<Entry> = Vec::new();

    let mut entry_for = |table: &mut HashMap<K, usize>, entries: &mut Vec<Entry>, key: K| -> usize {
        *table.entry(key).or_insert_with(|| {
            entries.push(Entry::default());
            entries.len() - 1
        })
    };

    // Pass 1: scan `current`.
    let mut new_refs: Vec<Slot> = Vec::with_capacity(current.len());
    for item in current {
        let idx = entry_for(&mut table, &mut entries, identify(item));
        entries[idx].occurrences_in_new += 1;
        new_refs.push(Slot::Table(idx));
    }

    // Pass 2: scan `previous`.
    let mut old_refs: Vec<Slot> = Vec::with_capacity(previous.len());
    for (offset, item) in previous.iter().enumerate() {
        let idx = entry_for(&mut table, &mut entries, identify(item));
        entries[idx].occurrences_in_old += 1;
        entries[idx].location_in_old = Some(offset as Offset);
        old_refs.push(Slot::Table(idx));
    }

    // Pass 3: anchor every identity that occurs exactly once on each side.
    for i in 0..new_refs.len() {
        if let Slot::Table(idx) = new_refs[i] {
            let entry = &entries[idx];
            if entry.occurrences_in_new == 1 && entry.occurrences_in_old == 1 {
                let j = entry.location_in_old.expect("anchored entry has a location");
                new_refs[i] = Slot::Remote(j);
                old_refs[j as usize] = Slot::Remote(i as Offset);
            }
        }
    }

    // Pass 4: classify everything that is not anchored, and collect move
    // candidates for anchored pairs that changed position.
    let mut removals = IndexSet::new();
    let mut inserts = IndexSet::new();
    let mut mutations = IndexSet::new();
    let mut move_candidates: Vec<(Offset, Offset)> = Vec::new();

    for (j, slot) in old_refs.iter().enumerate() {
        if matches!(slot, Slot::Table(_)) {
            removals.insert(j as Offset);
        }
    }
    for (i, slot) in new_refs.iter().enumerate() {
        match *slot {
            Slot::Table(_) => inserts.insert(i as Offset),
            Slot::Remote(j) => {
                let i = i as Offset;
                if j == i {
                    if !equal(&previous[j as usize], &current[i as usize]) {
                        mutations.insert(i);
                    }
                } else {
                    move_candidates.push((j, i));
                }
            }
        }
    }

    // Pass 5: elide moves that are fully explained by surrounding
    // removals/inserts; emit the rest.
    //
    // A candidate is only elided when the element is otherwise unchanged.
    // If it also mutated, eliding it would silently drop the value change
    // (reproduce's mutation step indexes `previous`/`current` at the same
    // raw offset, which does not hold for a source/destination pair that
    // only "looks" aligned after shifting — see DESIGN.md), so a mutated
    // candidate is always emitted as an explicit move even when its
    // position is otherwise explained by surrounding edits. This keeps
    // the reproducibility law intact, which spec.md §9 prioritises over
    // a literal port of the elision heuristic.
    let mut moves = Vec::new();
    for (j, i) in move_candidates {
        let is_mutated = !equal(&previous[j as usize], &current[i as usize]);
        if !is_mutated {
            let removals_before_j = removals.count_in(0..j) as Offset;
            let inserts_before_i = inserts.count_in(0..i) as Offset;
            let rep = j - removals_before_j + inserts_before_i;
            if rep == i {
                continue;
            }
        }
        moves.push(Move::new(j, i, is_mutated));
    }

    Changeset {
        inserts,
        removals,
        mutations,
        moves,
    }
}
