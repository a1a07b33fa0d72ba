//! Broadcast of [`Snapshot`]s to subscribers, generalised from
//! `medea-reactive`'s `SubscribersStore` trait
//! (`crates/medea-reactive/src/collections/subscribers_store.rs`) to carry
//! a `Snapshot<C>` instead of a raw value, and made `Send + Sync` so it
//! fits the multi-threaded model of [`crate::array::MutableObservableArray`].

use futures::channel::mpsc;
use futures::stream::BoxStream;
use parking_lot::Mutex;

use crate::snapshot::Snapshot;

/// A one-to-many broadcast of [`Snapshot`]s.
///
/// A fresh subscriber receives `initial` synchronously as the first item
/// of its stream, then every snapshot published afterwards. Dropping the
/// bus (and therefore every sender it holds) ends every outstanding
/// stream with `None` — no synthetic terminal value is needed, since
/// `futures::channel::mpsc` already gives that for free.
pub trait EventBus<C>: Default {
    /// Publishes `snapshot` to every current subscriber. Subscribers whose
    /// receiver has been dropped are pruned.
    fn publish(&self, snapshot: Snapshot<C>);

    /// Registers a new subscriber, returning a stream that yields `initial`
    /// immediately, then every snapshot published from this point on.
    fn subscribe(&self, initial: Snapshot<C>) -> BoxStream<'static, Snapshot<C>>;
}

/// The provided [`EventBus`] implementation: an unbounded `mpsc` sender per
/// subscriber, guarded by a [`parking_lot::Mutex`] rather than a `RefCell`,
/// since this crate's arrays are shared across threads.
#[derive(Debug)]
pub struct BroadcastBus<C> {
    senders: Mutex<Vec<mpsc::UnboundedSender<Snapshot<C>>>>,
}

impl<C> Default for BroadcastBus<C> {
    fn default() -> Self {
        Self {
            senders: Mutex::new(Vec::new()),
        }
    }
}

impl<C> EventBus<C> for BroadcastBus<C>
where
    C: Clone + Send + 'static,
{
    fn publish(&self, snapshot: Snapshot<C>) {
        self.senders
            .lock()
            .retain(|tx| tx.unbounded_send(snapshot.clone()).is_ok());
    }

    fn subscribe(&self, initial: Snapshot<C>) -> BoxStream<'static, Snapshot<C>> {
        let (tx, rx) = mpsc::unbounded();
        // Send before registering: a publish racing with this subscribe
        // call can only land after `initial`, never interleave before it.
        let _ = tx.unbounded_send(initial);
        self.senders.lock().push(tx);
        Box::pin(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changeset::Changeset;
    use futures::StreamExt;

    fn snapshot(n: i32) -> Snapshot<i32> {
        Snapshot::new(n - 1, n, Changeset::empty())
    }

    #[tokio::test]
    async fn subscriber_sees_initial_then_published() {
        let bus = BroadcastBus::default();
        let mut stream = bus.subscribe(snapshot(0));
        bus.publish(snapshot(1));
        bus.publish(snapshot(2));

        assert_eq!(stream.next().await, Some(snapshot(0)));
        assert_eq!(stream.next().await, Some(snapshot(1)));
        assert_eq!(stream.next().await, Some(snapshot(2)));
    }

    #[tokio::test]
    async fn dropping_bus_ends_every_stream() {
        let bus = BroadcastBus::default();
        let mut stream = bus.subscribe(snapshot(0));
        assert_eq!(stream.next().await, Some(snapshot(0)));

        drop(bus);
        assert_eq!(stream.next().await, None);
    }

    #[tokio::test]
    async fn dropped_subscriber_is_pruned_on_next_publish() {
        let bus = BroadcastBus::default();
        let stream = bus.subscribe(snapshot(0));
        drop(stream);

        bus.publish(snapshot(1));
        assert_eq!(bus.senders.lock().len(), 0);
    }
}
