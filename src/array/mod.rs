//! Observable, mutable, ordered container: spec.md §4.4.
//!
//! `MutableObservableArray<T>` batches an arbitrary sequence of edits
//! inside a single `modify` call, synthesises the net [`Changeset`] those
//! edits amount to, and publishes a [`Snapshot`] to every subscriber —
//! the same "stage, commit, publish" shape `medea-reactive`'s
//! `ObservableVec` uses for a single `push`/`remove`, generalised here to
//! an arbitrary batch of edits via [`StagingVec`].

mod staging;

use std::sync::Arc;

use arc_swap::ArcSwap;
use futures::stream::BoxStream;
use parking_lot::Mutex;

use crate::changeset::Changeset;
use crate::event_bus::{BroadcastBus, EventBus};
use crate::snapshot::Snapshot;

pub use staging::StagingVec;

/// Shared state between a [`MutableObservableArray`] and any
/// [`ArrayProducer`] handles obtained from it.
struct Inner<T> {
    storage: ArcSwap<Vec<T>>,
    write_lock: Mutex<()>,
    subs: BroadcastBus<Arc<Vec<T>>>,
}

/// An observable, mutable, ordered container of `T`.
///
/// Reads (`len`, `get`, `iter`) are lock-free: each call loads a cheap
/// `Arc` snapshot of the current storage. Mutation goes through
/// [`MutableObservableArray::modify`], which serialises writers with a
/// single mutex and publishes the resulting [`Snapshot`] to subscribers
/// before releasing it, per spec.md §5.
pub struct MutableObservableArray<T> {
    inner: Arc<Inner<T>>,
}

/// A handle that can subscribe to a [`MutableObservableArray`]'s
/// publications independently of the array's own lifetime.
///
/// Obtained via [`MutableObservableArray::producer`]. As long as any
/// `ArrayProducer` or `MutableObservableArray` referencing the same
/// underlying state is alive, subscriptions keep working — this is what
/// gives spec.md §8's "producer survives array release" property for
/// free, with no special-cased teardown handling.
pub struct ArrayProducer<T> {
    inner: Arc<Inner<T>>,
}

impl<T> MutableObservableArray<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Creates a new array seeded with `initial`'s contents.
    #[must_use]
    pub fn new(initial: Vec<T>) -> Self {
        Self {
            inner: Arc::new(Inner {
                storage: ArcSwap::from_pointee(initial),
                write_lock: Mutex::new(()),
                subs: BroadcastBus::default(),
            }),
        }
    }

    /// The number of elements currently in the array.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.storage.load().len()
    }

    /// Returns `true` if the array currently holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a clone of the element currently at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<T> {
        self.inner.storage.load().get(index).cloned()
    }

    /// Returns a cheap, point-in-time `Arc` snapshot of the array's
    /// current contents.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Vec<T>> {
        self.inner.storage.load_full()
    }

    /// Runs `f` against an exclusively-owned staging view seeded with the
    /// array's current contents, then commits `f`'s net edits as a single
    /// published [`Snapshot`].
    ///
    /// `f` must not call `modify` again on this same array: `write_lock`
    /// is not reentrant, and doing so deadlocks (see spec.md §7).
    pub fn modify(&self, f: impl FnOnce(&mut StagingVec<T>)) {
        let _guard = self.inner.write_lock.lock();

        let previous = self.inner.storage.load_full();
        let mut staging = StagingVec::new((*previous).clone());
        f(&mut staging);
        let (buffer, changeset) = staging.finish();

        if changeset.is_empty() {
            return;
        }

        let current = Arc::new(buffer);
        self.inner.storage.store(Arc::clone(&current));
        self.inner.subs.publish(Snapshot::new(previous, current, changeset));
    }

    /// Subscribes to this array's publications, as a stream whose first
    /// item is the current contents framed as an all-inserts initial
    /// snapshot (spec.md §4.5), followed by every snapshot published
    /// afterwards.
    #[must_use]
    pub fn subscribe(&self) -> BoxStream<'static, Snapshot<Arc<Vec<T>>>> {
        subscribe(&self.inner)
    }

    /// Returns a [`ArrayProducer`] handle that outlives this array's own
    /// lifetime and can still be subscribed to afterwards.
    #[must_use]
    pub fn producer(&self) -> ArrayProducer<T> {
        ArrayProducer {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> ArrayProducer<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Subscribes to the original array's publications, exactly as
    /// [`MutableObservableArray::subscribe`] does. Works even after every
    /// [`MutableObservableArray`] handle referencing the same state has
    /// been dropped, as long as this producer (or another clone of it)
    /// is still alive.
    #[must_use]
    pub fn subscribe(&self) -> BoxStream<'static, Snapshot<Arc<Vec<T>>>> {
        subscribe(&self.inner)
    }
}

impl<T> Clone for ArrayProducer<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

fn subscribe<T>(inner: &Arc<Inner<T>>) -> BoxStream<'static, Snapshot<Arc<Vec<T>>>>
where
    T: Clone + Send + Sync + 'static,
{
    let current = inner.storage.load_full();
    let count = current.len() as crate::index_set::Offset;
    inner.subs.subscribe(Snapshot::initial(current, count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn initial_snapshot_reports_every_element_as_inserted() {
        let array = MutableObservableArray::new(vec![1, 2, 3]);
        let mut sub = array.subscribe();
        let first = sub.next().await.expect("initial snapshot");
        assert!(first.previous.is_none());
        assert_eq!(*first.current, vec![1, 2, 3]);
        assert_eq!(first.changeset.inserts.ranges(), &[0..3]);
    }

    #[tokio::test]
    async fn modify_publishes_a_reproducible_snapshot() {
        let array = MutableObservableArray::new(vec![1, 2, 3]);
        let mut sub = array.subscribe();
        sub.next().await; // drain the initial snapshot

        array.modify(|staging| {
            staging.insert(1, 100);
            staging.remove(3);
        });

        let snapshot = sub.next().await.expect("published snapshot");
        let previous = snapshot.previous.expect("non-initial snapshot has previous");
        assert_eq!(*previous, vec![1, 2, 3]);
        assert_eq!(*snapshot.current, vec![1, 100, 2]);
        assert_eq!(snapshot.changeset.inserts.iter().collect::<Vec<_>>(), vec![1]);
        assert_eq!(snapshot.changeset.removals.iter().collect::<Vec<_>>(), vec![2]);

        let reproduced = crate::reproduce::apply(
            &previous,
            &snapshot.current,
            &snapshot.changeset,
            |a: &i32, b: &i32| a == b,
        );
        assert_eq!(reproduced, *snapshot.current);
    }

    #[tokio::test]
    async fn empty_edit_batch_publishes_nothing() {
        let array = MutableObservableArray::new(vec![1, 2, 3]);
        let mut sub = array.subscribe();
        sub.next().await;

        array.modify(|staging| {
            staging.insert(0, 9);
            staging.remove(0);
        });

        // Net effect is empty, so `modify` must not publish a no-op
        // snapshot. A second, real edit should be the very next item.
        array.modify(|staging| staging.append(4));
        let snapshot = sub.next().await.expect("published snapshot");
        assert_eq!(*snapshot.current, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn consecutive_snapshots_chain_previous_to_current() {
        let array = MutableObservableArray::new(vec![1]);
        let mut sub = array.subscribe();
        sub.next().await;

        array.modify(|staging| staging.append(2));
        array.modify(|staging| staging.append(3));

        let first = sub.next().await.expect("first edit");
        let second = sub.next().await.expect("second edit");
        assert_eq!(*first.current, second.previous.expect("has previous"));
    }

    #[tokio::test]
    async fn producer_survives_array_release() {
        let array = MutableObservableArray::new(vec![1, 2]);
        let producer = array.producer();
        drop(array);

        let mut sub = producer.subscribe();
        let first = sub.next().await.expect("initial snapshot");
        assert_eq!(*first.current, vec![1, 2]);

        drop(producer);
        assert_eq!(sub.next().await, None);
    }

    #[tokio::test]
    async fn modify_reproduces_when_a_mutation_is_shifted_by_an_earlier_insert() {
        // An insert followed by a `set` past it shifts the mutated
        // element's final position relative to its `previous` one; the
        // published changeset must capture that as a mutated move, not a
        // plain mutation, or reproduce::apply reads the wrong offset.
        let array = MutableObservableArray::new(vec![10, 20, 30]);
        let mut sub = array.subscribe();
        sub.next().await;

        array.modify(|staging| {
            staging.insert(0, 99);
            staging.set(2, 77);
        });

        let snapshot = sub.next().await.expect("published snapshot");
        let previous = snapshot.previous.expect("non-initial snapshot has previous");
        assert_eq!(*previous, vec![10, 20, 30]);
        assert_eq!(*snapshot.current, vec![99, 10, 77, 30]);
        assert!(snapshot.changeset.is_well_formed());

        let reproduced = crate::reproduce::apply(
            &previous,
            &snapshot.current,
            &snapshot.changeset,
            |a: &i32, b: &i32| a == b,
        );
        assert_eq!(reproduced, *snapshot.current);
    }

    #[tokio::test]
    async fn published_changesets_are_well_formed() {
        let array = MutableObservableArray::new(vec![1, 2, 3, 4, 5]);
        let mut sub = array.subscribe();
        sub.next().await;

        array.modify(|staging| {
            staging.remove(1);
            staging.set(0, 100);
            staging.append(6);
        });

        let snapshot = sub.next().await.expect("published snapshot");
        assert!(snapshot.changeset.is_well_formed());
    }
}
