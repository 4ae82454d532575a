//! Subscriber processors: long-lived consumers of the event bus.
//!
//! A [`Processor`] owns one inbound channel, registers it for one or more
//! [`Topic`]s, and runs a receive loop that hands each envelope to an
//! [`EventHandler`]. Every outcome, success or failure, goes to a
//! [`CompletionCallback`]; nothing is retried or returned to the publisher.
//!
//! | Handler                  | Topic                    | Forwards failures |
//! |--------------------------|--------------------------|-------------------|
//! | [`RecalculateItemCount`] | `listUpdated`            | no                |
//! | [`IndexList`]            | `listCreated`, `listUpdated` | yes           |
//! | [`DeindexList`]          | `listDeleted`            | yes               |
//! | [`IndexAllLists`]        | `indexAllListsRequested` | yes               |
//!
//! A processor handles its envelopes one at a time in arrival order, so
//! topics sharing a processor are also processed in publish order.
//!
//! Subscribe-before-start is enforced by the types: only a
//! [`SubscribedProcessor`] can be started.

pub mod item_count;
pub mod search_deindex;
pub mod search_index;

pub use item_count::RecalculateItemCount;
pub use search_deindex::DeindexList;
pub use search_index::{IndexAllLists, IndexList};

use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::FutureExt;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::domain::ListId;
use crate::events::{Envelope, EventBus, Payload, Topic};
use crate::reporting::ErrorReporter;
use crate::service::ProjectionError;

/// Per-event work performed by a processor.
#[async_trait]
pub trait EventHandler: fmt::Debug + Send + Sync + 'static {
    /// Short name used in logs and error reports.
    fn name(&self) -> &'static str;

    /// Whether failures should also reach the [`ErrorReporter`].
    fn forwards_failures(&self) -> bool {
        false
    }

    /// Processes one event.
    async fn handle(&self, topic: Topic, payload: &Payload) -> Result<(), ProjectionError>;
}

/// Observable state of a processor loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorState {
    /// Waiting for the next envelope.
    Idle,
    /// Running the handler for an envelope.
    Processing,
}

/// Outcome of one processed event, handed to the completion callback.
#[derive(Debug)]
pub struct Completion<'a> {
    /// Name of the handler that ran.
    pub processor: &'static str,
    /// Topic the envelope arrived on.
    pub topic: Topic,
    /// Payload the handler received.
    pub payload: &'a Payload,
    /// What the handler returned.
    pub result: &'a Result<(), ProjectionError>,
    /// Whether a failure should be forwarded to the error reporter.
    pub forward_failure: bool,
}

/// Receives every [`Completion`]. Called on the processor's task; must
/// not block.
pub type CompletionCallback = Arc<dyn Fn(&Completion<'_>) + Send + Sync>;

/// Production callback: logs every outcome and forwards failures of
/// handlers that ask for it to `reporter`.
#[must_use]
pub fn log_completion(reporter: Arc<dyn ErrorReporter>) -> CompletionCallback {
    Arc::new(move |completion: &Completion<'_>| match completion.result {
        Ok(()) => tracing::debug!(
            processor = completion.processor,
            topic = %completion.topic,
            payload = %completion.payload,
            "event processed"
        ),
        Err(error) => {
            tracing::error!(
                processor = completion.processor,
                topic = %completion.topic,
                payload = %completion.payload,
                error = %error,
                "event processing failed"
            );
            if completion.forward_failure {
                reporter.notify(completion.processor, error);
            }
        }
    })
}

/// Extracts the list ID a list-scoped topic must carry.
pub(crate) fn list_payload(topic: Topic, payload: &Payload) -> Result<ListId, ProjectionError> {
    payload
        .list_id()
        .ok_or(ProjectionError::UnexpectedPayload {
            topic,
            payload: *payload,
        })
}

/// A processor that has not yet subscribed to the bus.
pub struct Processor<H> {
    topics: Vec<Topic>,
    handler: H,
    sender: mpsc::Sender<Envelope>,
    receiver: mpsc::Receiver<Envelope>,
    on_complete: CompletionCallback,
}

impl<H: EventHandler> Processor<H> {
    /// Creates a processor for `topic` with an inbound channel holding up
    /// to `capacity` envelopes (at least one).
    #[must_use]
    pub fn new(topic: Topic, handler: H, capacity: usize, on_complete: CompletionCallback) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        Self {
            topics: vec![topic],
            handler,
            sender,
            receiver,
            on_complete,
        }
    }

    /// Also consumes `topic` through the same channel.
    #[must_use]
    pub fn with_topic(mut self, topic: Topic) -> Self {
        if !self.topics.contains(&topic) {
            self.topics.push(topic);
        }
        self
    }

    /// Registers the inbound channel with `bus` for every topic.
    ///
    /// Consumes the processor, so it can only happen once. The bus holds
    /// the only senders afterwards; the loop ends when every clone of the
    /// bus is dropped.
    #[must_use]
    pub fn subscribe(self, bus: &EventBus) -> SubscribedProcessor<H> {
        for &topic in &self.topics {
            bus.subscribe(topic, self.sender.clone());
        }
        let (state, _) = watch::channel(ProcessorState::Idle);
        tracing::info!(processor = self.handler.name(), topics = ?self.topics, "processor subscribed");
        SubscribedProcessor {
            topics: self.topics,
            handler: self.handler,
            receiver: self.receiver,
            on_complete: self.on_complete,
            state,
        }
    }
}

impl<H: EventHandler> fmt::Debug for Processor<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Processor")
            .field("topics", &self.topics)
            .field("handler", &self.handler)
            .finish_non_exhaustive()
    }
}

/// A processor whose channel is registered and which is ready to run.
pub struct SubscribedProcessor<H> {
    topics: Vec<Topic>,
    handler: H,
    receiver: mpsc::Receiver<Envelope>,
    on_complete: CompletionCallback,
    state: watch::Sender<ProcessorState>,
}

impl<H: EventHandler> SubscribedProcessor<H> {
    /// Topics the processor consumes.
    #[must_use]
    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    /// Returns a receiver tracking the idle/processing state.
    #[must_use]
    pub fn state(&self) -> watch::Receiver<ProcessorState> {
        self.state.subscribe()
    }

    /// Spawns [`Self::run`] on the current runtime.
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Runs the receive loop until the channel closes.
    ///
    /// Handler errors and panics are passed to the completion callback;
    /// the loop always goes back to idle and waits for the next envelope.
    pub async fn run(mut self) {
        let name = self.handler.name();
        tracing::info!(processor = name, topics = ?self.topics, "processor started");

        while let Some(envelope) = self.receiver.recv().await {
            self.state.send_replace(ProcessorState::Processing);

            let result = AssertUnwindSafe(self.handler.handle(envelope.topic(), envelope.payload()))
                .catch_unwind()
                .await
                .unwrap_or_else(|panic| Err(ProjectionError::Panicked(panic_message(&*panic))));

            let completion = Completion {
                processor: name,
                topic: envelope.topic(),
                payload: envelope.payload(),
                result: &result,
                forward_failure: self.handler.forwards_failures(),
            };
            let on_complete = &self.on_complete;
            if std::panic::catch_unwind(AssertUnwindSafe(|| on_complete(&completion))).is_err() {
                tracing::warn!(processor = name, "completion callback panicked");
            }

            self.state.send_replace(ProcessorState::Idle);
        }

        tracing::info!(processor = name, topics = ?self.topics, "channel closed; processor stopped");
    }
}

impl<H: EventHandler> fmt::Debug for SubscribedProcessor<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscribedProcessor")
            .field("topics", &self.topics)
            .field("handler", &self.handler)
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::error::Error;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::persistence::RepositoryError;

    /// Fails for list 1, panics for list 2, succeeds otherwise.
    #[derive(Debug)]
    struct Picky;

    #[async_trait]
    impl EventHandler for Picky {
        fn name(&self) -> &'static str {
            "picky"
        }

        fn forwards_failures(&self) -> bool {
            true
        }

        async fn handle(&self, topic: Topic, payload: &Payload) -> Result<(), ProjectionError> {
            let list_id = list_payload(topic, payload)?;
            match list_id.get() {
                1 => Err(RepositoryError::Unavailable("down".to_string()).into()),
                2 => panic!("boom"),
                _ => Ok(()),
            }
        }
    }

    type Outcome = (Payload, Result<(), String>);

    fn recording_callback() -> (CompletionCallback, mpsc::UnboundedReceiver<Outcome>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let callback: CompletionCallback = Arc::new(move |completion: &Completion<'_>| {
            let result = completion.result.as_ref().map(|_| ()).map_err(|e| e.to_string());
            let _ = tx.send((*completion.payload, result));
        });
        (callback, rx)
    }

    async fn next(rx: &mut mpsc::UnboundedReceiver<Outcome>) -> Outcome {
        let Ok(Some(outcome)) = tokio::time::timeout(Duration::from_secs(1), rx.recv()).await
        else {
            panic!("expected a completion");
        };
        outcome
    }

    #[tokio::test]
    async fn failure_does_not_poison_the_loop() {
        let bus = EventBus::new(8);
        let (callback, mut outcomes) = recording_callback();
        let processor = Processor::new(Topic::ListUpdated, Picky, 4, callback).subscribe(&bus);
        let _handle = processor.start();

        bus.publish(Topic::ListUpdated, ListId::new(1));
        bus.publish(Topic::ListUpdated, ListId::new(3));

        let (payload, result) = next(&mut outcomes).await;
        assert_eq!(payload, Payload::List(ListId::new(1)));
        assert!(result.is_err());

        let (payload, result) = next(&mut outcomes).await;
        assert_eq!(payload, Payload::List(ListId::new(3)));
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn panic_is_reported_and_loop_continues() {
        let bus = EventBus::new(8);
        let (callback, mut outcomes) = recording_callback();
        let _handle = Processor::new(Topic::ListUpdated, Picky, 4, callback)
            .subscribe(&bus)
            .start();

        bus.publish(Topic::ListUpdated, ListId::new(2));
        bus.publish(Topic::ListUpdated, ListId::new(5));

        let (_, result) = next(&mut outcomes).await;
        let Err(message) = result else {
            panic!("panic should be reported as failure");
        };
        assert!(message.contains("boom"));
        assert!(next(&mut outcomes).await.1.is_ok());
    }

    #[tokio::test]
    async fn payload_mismatch_is_an_error() {
        let bus = EventBus::new(8);
        let (callback, mut outcomes) = recording_callback();
        let _handle = Processor::new(Topic::ListUpdated, Picky, 4, callback)
            .subscribe(&bus)
            .start();

        bus.publish(Topic::ListUpdated, Payload::Empty);

        let (payload, result) = next(&mut outcomes).await;
        assert_eq!(payload, Payload::Empty);
        let Err(message) = result else {
            panic!("mismatch should fail");
        };
        assert_eq!(message, "unexpected payload empty on topic listUpdated");
    }

    #[tokio::test]
    async fn state_returns_to_idle() {
        let bus = EventBus::new(8);
        let (callback, mut outcomes) = recording_callback();
        let processor = Processor::new(Topic::ListUpdated, Picky, 4, callback).subscribe(&bus);
        let mut state = processor.state();
        assert_eq!(*state.borrow(), ProcessorState::Idle);
        let _handle = processor.start();

        bus.publish(Topic::ListUpdated, ListId::new(1));
        next(&mut outcomes).await;

        let idle = tokio::time::timeout(
            Duration::from_secs(1),
            state.wait_for(|s| *s == ProcessorState::Idle),
        )
        .await;
        assert!(matches!(idle, Ok(Ok(_))));
    }

    #[tokio::test]
    async fn panicking_callback_does_not_stop_the_loop() {
        let bus = EventBus::new(8);
        let (tx, mut outcomes) = mpsc::unbounded_channel();
        let panicked = Arc::new(AtomicBool::new(false));
        let first_call = Arc::clone(&panicked);
        let callback: CompletionCallback = Arc::new(move |completion: &Completion<'_>| {
            if !first_call.swap(true, Ordering::SeqCst) {
                panic!("callback failed");
            }
            let _ = tx.send(*completion.payload);
        });
        let processor = Processor::new(Topic::ListUpdated, Picky, 4, callback).subscribe(&bus);
        let mut state = processor.state();
        let _handle = processor.start();

        bus.publish(Topic::ListUpdated, ListId::new(3));
        bus.publish(Topic::ListUpdated, ListId::new(4));

        let Ok(Some(payload)) = tokio::time::timeout(Duration::from_secs(1), outcomes.recv()).await
        else {
            panic!("second event was not processed");
        };
        assert_eq!(payload, Payload::List(ListId::new(4)));
        assert!(panicked.load(Ordering::SeqCst));

        let idle = tokio::time::timeout(
            Duration::from_secs(1),
            state.wait_for(|s| *s == ProcessorState::Idle),
        )
        .await;
        assert!(matches!(idle, Ok(Ok(_))));
    }

    #[tokio::test]
    async fn extra_topics_share_one_ordered_channel() {
        let bus = EventBus::new(8);
        let (callback, mut outcomes) = recording_callback();
        let processor = Processor::new(Topic::ListCreated, Picky, 1, callback)
            .with_topic(Topic::ListUpdated)
            .with_topic(Topic::ListCreated)
            .subscribe(&bus);
        assert_eq!(processor.topics(), [Topic::ListCreated, Topic::ListUpdated]);
        assert_eq!(bus.subscriber_count(Topic::ListCreated), 1);
        assert_eq!(bus.subscriber_count(Topic::ListUpdated), 1);
        let _handle = processor.start();

        bus.publish(Topic::ListCreated, ListId::new(3));
        bus.publish(Topic::ListUpdated, ListId::new(4));
        bus.publish(Topic::ListCreated, ListId::new(5));
        bus.publish(Topic::ListUpdated, ListId::new(6));

        for id in 3..=6 {
            assert_eq!(next(&mut outcomes).await.0, Payload::List(ListId::new(id)));
        }
    }

    #[tokio::test]
    async fn loop_ends_when_bus_is_dropped() {
        let bus = EventBus::new(8);
        let (callback, _outcomes) = recording_callback();
        let handle = Processor::new(Topic::ListDeleted, Picky, 4, callback)
            .subscribe(&bus)
            .start();
        drop(bus);

        let joined = tokio::time::timeout(Duration::from_secs(1), handle).await;
        assert!(matches!(joined, Ok(Ok(()))));
    }

    #[derive(Debug, Default)]
    struct RecordingReporter {
        notified: Mutex<Vec<String>>,
    }

    impl ErrorReporter for RecordingReporter {
        fn notify(&self, context: &str, error: &(dyn Error + 'static)) {
            if let Ok(mut notified) = self.notified.lock() {
                notified.push(format!("{context}: {error}"));
            }
        }
    }

    #[test]
    fn log_completion_forwards_only_when_asked() {
        let reporter = Arc::new(RecordingReporter::default());
        let callback = log_completion(Arc::clone(&reporter) as Arc<dyn ErrorReporter>);
        let payload = Payload::List(ListId::new(4));
        let failed: Result<(), ProjectionError> = Err(ProjectionError::ListNotFound(ListId::new(4)));
        let ok: Result<(), ProjectionError> = Ok(());

        for (result, forward_failure) in [(&failed, false), (&ok, true), (&failed, true)] {
            callback(&Completion {
                processor: "test",
                topic: Topic::ListUpdated,
                payload: &payload,
                result,
                forward_failure,
            });
        }

        let notified = reporter
            .notified
            .lock()
            .map(|n| n.clone())
            .unwrap_or_default();
        assert_eq!(notified, vec!["test: list 4 no longer exists".to_string()]);
    }
}
