//! In-process publish/subscribe bus for domain events.
//!
//! [`EventBus`] maps each [`Topic`] to the inbound channels of its
//! subscribers. Producers call [`EventBus::publish`] after committing a
//! mutation; every channel registered for the topic receives a copy of the
//! [`Envelope`]. There is no unsubscribe: a channel stays registered for
//! the lifetime of the bus.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use super::{Envelope, Payload, Topic};

/// Registry type: topic to subscriber channels, in subscription order.
type Registry = HashMap<Topic, Vec<Subscriber>>;

/// One registered channel. Every registration of the same channel, on any
/// topic, shares a single backlog.
#[derive(Debug, Clone)]
struct Subscriber {
    sender: mpsc::Sender<Envelope>,
    backlog: Arc<Mutex<Backlog>>,
}

/// Envelopes waiting for room in a full channel, oldest first.
#[derive(Debug, Default)]
struct Backlog {
    queue: VecDeque<(Envelope, OwnedSemaphorePermit)>,
    draining: bool,
}

/// Publish/subscribe hub for [`Envelope`]s.
///
/// Cheap to clone; clones share the same registry.
///
/// # Delivery
///
/// `publish` never blocks and never fails. It copies the subscriber list
/// under a read lock, releases the lock, then offers the envelope to each
/// channel with `try_send`. When a channel is full the envelope goes to that
/// channel's backlog, which a spawned task drains in order, so one slow
/// subscriber never delays another or the publisher. While a backlog is
/// non-empty, later envelopes for the channel queue behind it instead of
/// skipping ahead, keeping per-channel FIFO order.
///
/// At most `max_inflight` envelopes wait in backlogs at a time, across all
/// channels. Past that limit the envelope is dropped for that subscriber and
/// counted in [`EventBus::dropped_deliveries`].
#[derive(Debug, Clone)]
pub struct EventBus {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    subscribers: RwLock<Registry>,
    inflight: Arc<Semaphore>,
    dropped: AtomicU64,
}

impl EventBus {
    /// Largest accepted backlog limit.
    pub const MAX_INFLIGHT: usize = Semaphore::MAX_PERMITS;

    /// Creates a bus allowing at most `max_inflight` backlogged envelopes
    /// across all topics, clamped to `1..=`[`Self::MAX_INFLIGHT`].
    #[must_use]
    pub fn new(max_inflight: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                subscribers: RwLock::new(HashMap::new()),
                inflight: Arc::new(Semaphore::new(max_inflight.clamp(1, Self::MAX_INFLIGHT))),
                dropped: AtomicU64::new(0),
            }),
        }
    }

    /// Registers `sender` to receive every future envelope on `topic`.
    ///
    /// Registering the same channel twice is allowed and results in two
    /// deliveries per publish.
    pub fn subscribe(&self, topic: Topic, sender: mpsc::Sender<Envelope>) {
        let mut registry = self
            .inner
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        let backlog = registry
            .values()
            .flatten()
            .find(|existing| existing.sender.same_channel(&sender))
            .map_or_else(Arc::default, |existing| Arc::clone(&existing.backlog));

        let subscribers = registry.entry(topic).or_default();
        if subscribers
            .iter()
            .any(|existing| existing.sender.same_channel(&sender))
        {
            tracing::debug!(%topic, "channel subscribed more than once; deliveries will repeat");
        }
        subscribers.push(Subscriber { sender, backlog });
        tracing::debug!(%topic, subscribers = subscribers.len(), "subscriber registered");
    }

    /// Publishes `payload` on `topic` to every current subscriber.
    ///
    /// Returns the number of subscribers the envelope was addressed to.
    /// With no subscribers this is a no-op returning `0`.
    pub fn publish(&self, topic: Topic, payload: impl Into<Payload>) -> usize {
        let subscribers = {
            let registry = self
                .inner
                .subscribers
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            match registry.get(&topic) {
                Some(subscribers) if !subscribers.is_empty() => subscribers.clone(),
                _ => return 0,
            }
        };

        let envelope = Envelope::new(topic, payload.into());
        tracing::trace!(%topic, payload = %envelope.payload(), subscribers = subscribers.len(), "publishing");

        let addressed = subscribers.len();
        for subscriber in &subscribers {
            self.offer(subscriber, envelope.clone());
        }
        addressed
    }

    /// Number of channels registered for `topic`, duplicates included.
    #[must_use]
    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.inner
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&topic)
            .map_or(0, Vec::len)
    }

    /// Number of deliveries abandoned because the backlog limit was hit or
    /// no runtime was available to drain them.
    #[must_use]
    pub fn dropped_deliveries(&self) -> u64 {
        self.inner.dropped.load(Ordering::Relaxed)
    }

    /// Sends directly when the channel has room and nothing is queued ahead,
    /// otherwise appends to the channel's backlog.
    fn offer(&self, subscriber: &Subscriber, envelope: Envelope) {
        let topic = envelope.topic();
        let mut backlog = subscriber
            .backlog
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let envelope = if backlog.draining {
            envelope
        } else {
            match subscriber.sender.try_send(envelope) {
                Ok(()) => return,
                Err(TrySendError::Full(envelope)) => envelope,
                Err(TrySendError::Closed(_)) => {
                    tracing::debug!(%topic, "subscriber channel closed; skipping");
                    return;
                }
            }
        };

        let Ok(permit) = Arc::clone(&self.inner.inflight).try_acquire_owned() else {
            self.record_drop(topic, "backlog limit reached");
            return;
        };
        if !backlog.draining {
            let Ok(runtime) = Handle::try_current() else {
                self.record_drop(topic, "no async runtime available to drain backlog");
                return;
            };
            backlog.draining = true;
            runtime.spawn(drain(
                subscriber.sender.clone(),
                Arc::clone(&subscriber.backlog),
            ));
        }
        backlog.queue.push_back((envelope, permit));
    }

    fn record_drop(&self, topic: Topic, reason: &'static str) {
        let dropped = self.inner.dropped.fetch_add(1, Ordering::Relaxed).saturating_add(1);
        tracing::warn!(%topic, reason, dropped, "event delivery dropped");
    }
}

/// Feeds a channel from its backlog until the backlog is empty.
async fn drain(sender: mpsc::Sender<Envelope>, backlog: Arc<Mutex<Backlog>>) {
    loop {
        let next = {
            let mut backlog = backlog.lock().unwrap_or_else(PoisonError::into_inner);
            let Some(next) = backlog.queue.pop_front() else {
                backlog.draining = false;
                return;
            };
            next
        };

        let (envelope, _permit) = next;
        let topic = envelope.topic();
        if sender.send(envelope).await.is_err() {
            let mut backlog = backlog.lock().unwrap_or_else(PoisonError::into_inner);
            let discarded = backlog.queue.len();
            backlog.queue.clear();
            backlog.draining = false;
            tracing::debug!(%topic, discarded, "subscriber channel closed while draining backlog");
            return;
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::domain::ListId;

    async fn recv(rx: &mut mpsc::Receiver<Envelope>) -> Envelope {
        let Ok(Some(envelope)) = tokio::time::timeout(Duration::from_secs(1), rx.recv()).await
        else {
            panic!("expected an envelope");
        };
        envelope
    }

    #[test]
    fn publish_without_subscribers_is_noop() {
        let bus = EventBus::new(8);
        assert_eq!(bus.publish(Topic::ListUpdated, ListId::new(1)), 0);
        assert_eq!(bus.dropped_deliveries(), 0);
    }

    #[tokio::test]
    async fn subscriber_receives_envelope() {
        let bus = EventBus::new(8);
        let (tx, mut rx) = mpsc::channel(4);
        bus.subscribe(Topic::ListUpdated, tx);

        assert_eq!(bus.publish(Topic::ListUpdated, ListId::new(7)), 1);

        let envelope = recv(&mut rx).await;
        assert_eq!(envelope.topic(), Topic::ListUpdated);
        assert_eq!(*envelope.payload(), Payload::List(ListId::new(7)));
    }

    #[tokio::test]
    async fn other_topics_are_not_delivered() {
        let bus = EventBus::new(8);
        let (tx, mut rx) = mpsc::channel(4);
        bus.subscribe(Topic::ListDeleted, tx);

        assert_eq!(bus.publish(Topic::ListUpdated, ListId::new(7)), 0);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn duplicate_subscription_delivers_twice() {
        let bus = EventBus::new(8);
        let (tx, mut rx) = mpsc::channel(4);
        bus.subscribe(Topic::ListUpdated, tx.clone());
        bus.subscribe(Topic::ListUpdated, tx);
        assert_eq!(bus.subscriber_count(Topic::ListUpdated), 2);

        bus.publish(Topic::ListUpdated, ListId::new(5));

        assert_eq!(*recv(&mut rx).await.payload(), Payload::List(ListId::new(5)));
        assert_eq!(*recv(&mut rx).await.payload(), Payload::List(ListId::new(5)));
    }

    #[tokio::test]
    async fn every_subscriber_gets_a_copy() {
        let bus = EventBus::new(8);
        let (tx1, mut rx1) = mpsc::channel(4);
        let (tx2, mut rx2) = mpsc::channel(4);
        bus.subscribe(Topic::ListCreated, tx1);
        bus.subscribe(Topic::ListCreated, tx2);

        assert_eq!(bus.publish(Topic::ListCreated, ListId::new(1)), 2);
        assert_eq!(recv(&mut rx1).await, recv(&mut rx2).await);
    }

    #[tokio::test]
    async fn fifo_per_channel_while_subscriber_keeps_up() {
        let bus = EventBus::new(8);
        let (tx, mut rx) = mpsc::channel(16);
        bus.subscribe(Topic::ListUpdated, tx);

        for id in 0..10 {
            bus.publish(Topic::ListUpdated, ListId::new(id));
        }
        for id in 0..10 {
            assert_eq!(recv(&mut rx).await.payload().list_id(), Some(ListId::new(id)));
        }
    }

    #[tokio::test]
    async fn full_channel_does_not_block_publisher() {
        let bus = EventBus::new(8);
        let (slow_tx, mut slow_rx) = mpsc::channel(1);
        let (fast_tx, mut fast_rx) = mpsc::channel(8);
        bus.subscribe(Topic::ListUpdated, slow_tx);
        bus.subscribe(Topic::ListUpdated, fast_tx);

        for id in 0..3 {
            bus.publish(Topic::ListUpdated, ListId::new(id));
        }

        for id in 0..3 {
            assert_eq!(recv(&mut fast_rx).await.payload().list_id(), Some(ListId::new(id)));
        }

        for id in 0..3 {
            assert_eq!(recv(&mut slow_rx).await.payload().list_id(), Some(ListId::new(id)));
        }
        assert_eq!(bus.dropped_deliveries(), 0);
    }

    #[tokio::test]
    async fn overflow_beyond_limit_is_dropped_and_counted() {
        let bus = EventBus::new(1);
        let (tx, mut rx) = mpsc::channel(1);
        bus.subscribe(Topic::ListUpdated, tx);

        // sent, backlogged (holds the only permit), dropped
        for id in 0..3 {
            bus.publish(Topic::ListUpdated, ListId::new(id));
        }
        assert_eq!(bus.dropped_deliveries(), 1);

        recv(&mut rx).await;
        recv(&mut rx).await;
        let nothing = tokio::time::timeout(Duration::from_millis(50), rx.recv()).await;
        assert!(nothing.is_err());
    }

    #[tokio::test]
    async fn later_publish_queues_behind_backlog() {
        let bus = EventBus::new(8);
        let (tx, mut rx) = mpsc::channel(2);
        bus.subscribe(Topic::ListUpdated, tx);

        // 1 and 2 fill the channel, 3 is backlogged
        for id in 1..=3 {
            bus.publish(Topic::ListUpdated, ListId::new(id));
        }
        // frees a slot before the drain task has run
        let first = rx.try_recv().ok().and_then(|e| e.payload().list_id());
        assert_eq!(first, Some(ListId::new(1)));
        bus.publish(Topic::ListUpdated, ListId::new(4));

        for id in 2..=4 {
            assert_eq!(recv(&mut rx).await.payload().list_id(), Some(ListId::new(id)));
        }
        assert_eq!(bus.dropped_deliveries(), 0);
    }

    #[tokio::test]
    async fn channel_on_two_topics_keeps_publish_order() {
        let bus = EventBus::new(8);
        let (tx, mut rx) = mpsc::channel(1);
        bus.subscribe(Topic::ListCreated, tx.clone());
        bus.subscribe(Topic::ListUpdated, tx);

        bus.publish(Topic::ListCreated, ListId::new(1));
        bus.publish(Topic::ListCreated, ListId::new(2));
        bus.publish(Topic::ListUpdated, ListId::new(2));

        let expected = [
            (Topic::ListCreated, 1),
            (Topic::ListCreated, 2),
            (Topic::ListUpdated, 2),
        ];
        for (topic, id) in expected {
            assert_eq!(
                recv(&mut rx).await,
                Envelope::new(topic, Payload::List(ListId::new(id)))
            );
        }
    }

    #[tokio::test]
    async fn zero_limit_is_raised_to_one() {
        let bus = EventBus::new(0);
        let (tx, mut rx) = mpsc::channel(1);
        bus.subscribe(Topic::ListUpdated, tx);

        bus.publish(Topic::ListUpdated, ListId::new(1));
        bus.publish(Topic::ListUpdated, ListId::new(2));
        assert_eq!(bus.dropped_deliveries(), 0);

        recv(&mut rx).await;
        assert_eq!(recv(&mut rx).await.payload().list_id(), Some(ListId::new(2)));
    }

    #[test]
    fn oversized_limit_is_clamped() {
        let bus = EventBus::new(usize::MAX);
        assert_eq!(bus.dropped_deliveries(), 0);
    }

    #[test]
    fn overflow_without_runtime_is_dropped() {
        let bus = EventBus::new(8);
        let (tx, _rx) = mpsc::channel(1);
        bus.subscribe(Topic::ListUpdated, tx);

        bus.publish(Topic::ListUpdated, ListId::new(1));
        bus.publish(Topic::ListUpdated, ListId::new(2));
        assert_eq!(bus.dropped_deliveries(), 1);
    }

    #[tokio::test]
    async fn closed_channel_is_skipped() {
        let bus = EventBus::new(8);
        let (tx, rx) = mpsc::channel(1);
        bus.subscribe(Topic::ListDeleted, tx);
        drop(rx);

        assert_eq!(bus.publish(Topic::ListDeleted, ListId::new(1)), 1);
        assert_eq!(bus.dropped_deliveries(), 0);
    }

    #[tokio::test]
    async fn concurrent_subscribe_and_publish() {
        let bus = EventBus::new(64);
        let mut receivers = Vec::new();
        let mut tasks = Vec::new();
        for _ in 0..8 {
            let (tx, rx) = mpsc::channel(64);
            receivers.push(rx);
            let bus = bus.clone();
            tasks.push(tokio::spawn(async move {
                bus.subscribe(Topic::ListUpdated, tx);
                bus.publish(Topic::ListUpdated, ListId::new(1));
            }));
        }
        for task in tasks {
            assert!(task.await.is_ok());
        }
        assert_eq!(bus.subscriber_count(Topic::ListUpdated), 8);

        // each receiver subscribed before its own publish, so it saw at least one
        for rx in &mut receivers {
            recv(rx).await;
        }
    }
}
