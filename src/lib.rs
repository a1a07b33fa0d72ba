//! A diff engine and an observable, mutable, ordered container that share
//! one changeset format.
//!
//! Two pieces make up this crate:
//!
//! - [`diff::diff`] computes a [`Changeset`] between two arbitrary
//!   sequences given caller-supplied identity and equality functions.
//! - [`array::MutableObservableArray`] is an ordered container that
//!   batches edits inside [`array::MutableObservableArray::modify`] and
//!   publishes a [`Snapshot`] describing their net effect to subscribers.
//!
//! Both paths produce the same [`Changeset`] shape, and both obey the
//! same reproducibility law: applying a changeset to its `previous`
//! sequence via [`reproduce::apply`] reproduces `current`, under
//! caller-supplied equality.
//!
//! # Diffing two sequences
//!
//! ```
//! use reactive_collections::diff::diff;
//!
//! let previous = [0, 1, 2, 3];
//! let current = [1, 2, 3, 0];
//! let changeset = diff(&previous, &current, |x: &i32| *x, |a, b| a == b);
//! assert!(!changeset.moves.is_empty());
//! ```
//!
//! # Observing a mutable array
//!
//! ```
//! use reactive_collections::array::MutableObservableArray;
//! use futures::{executor, StreamExt as _};
//!
//! executor::block_on(async {
//!     let array = MutableObservableArray::new(vec![1, 2, 3]);
//!     let mut changes = array.subscribe();
//!
//!     // The first item is the array's current contents, framed as an
//!     // all-inserts initial snapshot.
//!     let initial = changes.next().await.unwrap();
//!     assert!(initial.previous.is_none());
//!
//!     array.modify(|staging| {
//!         staging.insert(1, 100);
//!         staging.remove(3);
//!     });
//!
//!     let snapshot = changes.next().await.unwrap();
//!     assert_eq!(*snapshot.current, vec![1, 100, 2]);
//! });
//! ```

pub mod array;
pub mod changeset;
pub mod diff;
pub mod event_bus;
pub mod index_set;
pub mod reproduce;
pub mod snapshot;

pub use array::{ArrayProducer, MutableObservableArray, StagingVec};
pub use changeset::{Changeset, Move};
pub use diff::diff;
pub use event_bus::{BroadcastBus, EventBus};
pub use index_set::{IndexSet, Offset};
pub use snapshot::Snapshot;
