//! Event emitter - turns store commits into published events.
//!
//! The store side only enqueues; all fan-out happens in the dispatcher task.

use crate::collection::CollectionIndex;
use resync_model::FieldDiff;
use resync_types::{CollectionEvent, Fields, IdentityMapper, ResourceId, Rid, StoreEvent};
use std::sync::Arc;
use tokio::sync::{RwLock, broadcast, mpsc, oneshot};
use tracing::{debug, info, warn};

/// A committed mutation, as enqueued by the store.
#[derive(Debug, Clone)]
pub enum Commit {
    /// A resource was provisioned with `value`.
    Created { id: ResourceId, value: Fields },

    /// A resource was updated; `value` is the new complete value.
    Updated {
        id: ResourceId,
        diff: FieldDiff,
        value: Fields,
    },

    /// A resource was removed.
    Deleted { id: ResourceId },
}

impl Commit {
    #[must_use]
    pub fn id(&self) -> &ResourceId {
        match self {
            Self::Created { id, .. } | Self::Updated { id, .. } | Self::Deleted { id } => id,
        }
    }
}

enum Envelope {
    Commit(Commit),
    /// Barrier: answered once everything queued before it was dispatched.
    Flush(oneshot::Sender<()>),
}

/// Handle to the dispatcher. Cheap to clone; the dispatcher stops when the
/// last handle is dropped.
#[derive(Clone)]
pub struct EventEmitter {
    commits: mpsc::UnboundedSender<Envelope>,
    events: broadcast::Sender<StoreEvent>,
    collections: Arc<RwLock<Vec<CollectionIndex>>>,
}

impl EventEmitter {
    /// Spawns the dispatcher on the current tokio runtime.
    ///
    /// `collections` should already be seeded with the existing members.
    #[must_use]
    pub fn spawn(
        mapper: IdentityMapper,
        collections: Vec<CollectionIndex>,
        capacity: usize,
    ) -> Self {
        let (commits, queue) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(capacity.max(1));
        let collections = Arc::new(RwLock::new(collections));

        tokio::spawn(run_dispatcher(
            queue,
            events.clone(),
            Arc::clone(&collections),
            mapper,
        ));

        Self {
            commits,
            events,
            collections,
        }
    }

    /// Enqueues a commit. Never waits.
    pub fn publish(&self, commit: Commit) {
        let id = commit.id().clone();
        if self.commits.send(Envelope::Commit(commit)).is_err() {
            warn!("Event dispatcher stopped, dropping commit for {}", id);
        }
    }

    /// Subscribes to events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Waits until every commit enqueued before this call was dispatched.
    pub async fn flush(&self) {
        let (done, wait) = oneshot::channel();
        if self.commits.send(Envelope::Flush(done)).is_ok() {
            let _ = wait.await;
        }
    }

    /// Member RIDs of a collection in order, or `None` for an unknown
    /// collection.
    pub async fn collection(&self, collection: &Rid) -> Option<Vec<Rid>> {
        self.collections
            .read()
            .await
            .iter()
            .find(|index| index.collection() == collection)
            .map(CollectionIndex::rids)
    }
}

async fn run_dispatcher(
    mut queue: mpsc::UnboundedReceiver<Envelope>,
    events: broadcast::Sender<StoreEvent>,
    collections: Arc<RwLock<Vec<CollectionIndex>>>,
    mapper: IdentityMapper,
) {
    while let Some(envelope) = queue.recv().await {
        match envelope {
            Envelope::Commit(commit) => dispatch(commit, &events, &collections, &mapper).await,
            Envelope::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
    info!("Event dispatcher stopped");
}

async fn dispatch(
    commit: Commit,
    events: &broadcast::Sender<StoreEvent>,
    collections: &RwLock<Vec<CollectionIndex>>,
    mapper: &IdentityMapper,
) {
    let (member_event, collection_events): (StoreEvent, Vec<CollectionEvent>) = {
        let mut indices = collections.write().await;
        match commit {
            Commit::Created { id, value } => {
                let deltas = indices
                    .iter_mut()
                    .filter_map(|index| index.insert(&id, &value))
                    .collect();
                let rid = mapper.id_to_rid(&id);
                (StoreEvent::Created { id, rid, value }, deltas)
            }
            Commit::Updated { id, diff, value } => {
                let deltas = indices
                    .iter_mut()
                    .filter_map(|index| index.apply_change(&id, &diff, &value))
                    .collect();
                let rid = mapper.id_to_rid(&id);
                (StoreEvent::Changed(diff.into_change_event(id, rid)), deltas)
            }
            Commit::Deleted { id } => {
                let deltas = indices
                    .iter_mut()
                    .filter_map(|index| index.remove(&id))
                    .collect();
                let rid = mapper.id_to_rid(&id);
                (StoreEvent::Deleted { id, rid }, deltas)
            }
        }
    };

    debug!(
        "Dispatching {} event for {} ({} collection deltas)",
        event_kind(&member_event),
        member_event.rid(),
        collection_events.len()
    );

    // Send fails only when nobody is subscribed.
    let _ = events.send(member_event);
    for event in collection_events {
        let _ = events.send(StoreEvent::Collection(event));
    }
}

fn event_kind(event: &StoreEvent) -> &'static str {
    match event {
        StoreEvent::Created { .. } => "created",
        StoreEvent::Changed(_) => "changed",
        StoreEvent::Deleted { .. } => "deleted",
        StoreEvent::Collection(_) => "collection",
    }
}
