//! Pipeline bootstrap: builds every processor, subscribes it, and spawns
//! its loop.
//!
//! Search upserts for `listCreated` and `listUpdated` share one processor,
//! so a list's documents are written in the order its events were
//! published.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::events::{EventBus, Topic};
use crate::persistence::ListRepository;
use crate::processors::{
    CompletionCallback, DeindexList, EventHandler, IndexAllLists, IndexList, Processor,
    RecalculateItemCount,
};
use crate::search::SearchClient;
use crate::service::{ItemCountService, SearchIndexService};

/// Tuning knobs for the processors.
#[derive(Debug, Clone, Copy)]
pub struct PipelineConfig {
    /// Capacity of each processor's inbound channel.
    pub channel_capacity: usize,
    /// Lists per search request during a full reindex.
    pub reindex_batch_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 256,
            reindex_batch_size: 100,
        }
    }
}

/// Running processors. Each one is subscribed exactly once.
#[derive(Debug)]
pub struct Pipeline {
    handles: Vec<(&'static str, &'static [Topic], JoinHandle<()>)>,
}

impl Pipeline {
    /// Subscribes and starts every processor on `bus`.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn start(
        bus: &EventBus,
        repository: Arc<dyn ListRepository>,
        search: Arc<dyn SearchClient>,
        on_complete: &CompletionCallback,
        config: PipelineConfig,
    ) -> Self {
        let item_counts = ItemCountService::new(Arc::clone(&repository));
        let search_index = SearchIndexService::new(repository, search);

        let mut pipeline = Self {
            handles: Vec::with_capacity(4),
        };
        let capacity = config.channel_capacity;
        pipeline.spawn(
            bus,
            &[Topic::ListUpdated],
            RecalculateItemCount::new(item_counts),
            capacity,
            on_complete,
        );
        pipeline.spawn(
            bus,
            &[Topic::ListCreated, Topic::ListUpdated],
            IndexList::new(search_index.clone()),
            capacity,
            on_complete,
        );
        pipeline.spawn(
            bus,
            &[Topic::ListDeleted],
            DeindexList::new(search_index.clone()),
            capacity,
            on_complete,
        );
        pipeline.spawn(
            bus,
            &[Topic::IndexAllListsRequested],
            IndexAllLists::new(search_index, config.reindex_batch_size),
            capacity,
            on_complete,
        );

        tracing::info!(processors = pipeline.handles.len(), "event pipeline started");
        pipeline
    }

    fn spawn<H: EventHandler>(
        &mut self,
        bus: &EventBus,
        topics: &'static [Topic],
        handler: H,
        capacity: usize,
        on_complete: &CompletionCallback,
    ) {
        let name = handler.name();
        let Some((&first, rest)) = topics.split_first() else {
            tracing::warn!(processor = name, "processor has no topics; not started");
            return;
        };
        let processor = rest.iter().fold(
            Processor::new(first, handler, capacity, Arc::clone(on_complete)),
            |processor, &topic| processor.with_topic(topic),
        );
        let handle = processor.subscribe(bus).start();
        self.handles.push((name, topics, handle));
    }

    /// Number of running processors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Returns `true` if no processor is running.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Stops every processor. Envelopes still queued are discarded.
    pub fn abort(self) {
        for (name, topics, handle) in self.handles {
            handle.abort();
            tracing::debug!(processor = name, ?topics, "processor aborted");
        }
    }
}
