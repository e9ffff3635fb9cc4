use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, info_span, instrument, warn, Instrument};

use crate::api::DrillApi;
use crate::error::ApiError;

// =============================================================================
// 1. THE ABSTRACTION
// =============================================================================

/// A resource whose collection is mirrored from the remote service.
#[async_trait]
pub trait Entity: Clone + Debug + Send + Sync + 'static {
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug;
    /// Selects which slice of the collection is listed.
    type Query: Clone + Default + Debug + Send + Sync;

    /// Name used in logs.
    const KIND: &'static str;

    fn id(&self) -> &Self::Id;

    async fn fetch(api: &dyn DrillApi, query: &Self::Query) -> Result<Vec<Self>, ApiError>;
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum FrameworkError {
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped")]
    ActorDropped,
    #[error(transparent)]
    Remote(#[from] ApiError),
}

/// Lifecycle of one collection. There is no error state: a failed fetch
/// returns to `Ready` with the last good items and `last_error` set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreStatus {
    Idle,
    Loading,
    Ready,
    Refreshing,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    Updated(usize),
    /// The fetch failed; the previous collection is still in place.
    Stale(ApiError),
}

#[derive(Debug, Clone)]
pub struct Snapshot<T: Entity> {
    pub items: Vec<T>,
    pub status: StoreStatus,
    pub last_error: Option<ApiError>,
    pub query: T::Query,
}

// =============================================================================
// 2. THE GENERIC MESSAGES
// =============================================================================

pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

#[derive(Debug)]
pub enum ResourceRequest<T: Entity> {
    /// Foreground load. `query`, when given, replaces the stored one first.
    Load {
        query: Option<T::Query>,
        respond_to: Response<Vec<T>>,
    },
    /// Silent background refresh.
    Refresh {
        respond_to: Response<RefreshOutcome>,
    },
    /// Merge a freshly created entity: swap it in when a refresh already
    /// brought it, append otherwise.
    Insert {
        item: T,
        respond_to: Response<()>,
    },
    /// Swap the entity with the same id; others stay untouched.
    Replace {
        item: T,
        respond_to: Response<bool>,
    },
    Snapshot {
        respond_to: Response<Snapshot<T>>,
    },
}

// =============================================================================
// 3. THE GENERIC ACTOR
// =============================================================================

pub struct ResourceActor<T: Entity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    api: Arc<dyn DrillApi>,
    items: Vec<T>,
    query: T::Query,
    last_error: Option<ApiError>,
    status: watch::Sender<StoreStatus>,
}

impl<T: Entity> ResourceActor<T> {
    pub fn new(buffer_size: usize, api: Arc<dyn DrillApi>) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let (status, status_rx) = watch::channel(StoreStatus::Idle);
        let actor = Self {
            receiver,
            api,
            items: Vec::new(),
            query: T::Query::default(),
            last_error: None,
            status,
        };
        let client = ResourceClient { sender, status: status_rx };
        (actor, client)
    }

    #[instrument(name = "resource_actor", skip(self), fields(kind = T::KIND))]
    pub async fn run(mut self) {
        info!("Store starting");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Load { query, respond_to } => {
                    let result = self.handle_load(query).await;
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Refresh { respond_to } => {
                    let outcome = self.handle_refresh().await;
                    let _ = respond_to.send(Ok(outcome));
                }
                ResourceRequest::Insert { item, respond_to } => {
                    self.handle_insert(item);
                    let _ = respond_to.send(Ok(()));
                }
                ResourceRequest::Replace { item, respond_to } => {
                    let replaced = self.handle_replace(item);
                    let _ = respond_to.send(Ok(replaced));
                }
                ResourceRequest::Snapshot { respond_to } => {
                    let _ = respond_to.send(Ok(self.snapshot()));
                }
            }
        }

        info!("Store stopped");
    }

    async fn handle_load(&mut self, query: Option<T::Query>) -> Result<Vec<T>, FrameworkError> {
        if let Some(query) = query {
            debug!(?query, "Query changed");
            self.query = query;
        }
        self.status.send_replace(StoreStatus::Loading);

        let result = T::fetch(self.api.as_ref(), &self.query).await;
        self.status.send_replace(StoreStatus::Ready);

        match result {
            Ok(items) => {
                info!(count = items.len(), "Collection loaded");
                self.items = items;
                self.last_error = None;
                Ok(self.items.clone())
            }
            Err(e) => {
                warn!(error = %e, "Foreground load failed");
                self.last_error = Some(e.clone());
                Err(FrameworkError::Remote(e))
            }
        }
    }

    async fn handle_refresh(&mut self) -> RefreshOutcome {
        self.status.send_replace(StoreStatus::Refreshing);

        let result = T::fetch(self.api.as_ref(), &self.query).await;
        self.status.send_replace(StoreStatus::Ready);

        match result {
            Ok(items) => {
                debug!(count = items.len(), "Collection refreshed");
                let count = items.len();
                self.items = items;
                self.last_error = None;
                RefreshOutcome::Updated(count)
            }
            Err(e) => {
                warn!(error = %e, kept = self.items.len(), "Background refresh failed, keeping last collection");
                self.last_error = Some(e.clone());
                RefreshOutcome::Stale(e)
            }
        }
    }

    fn handle_insert(&mut self, item: T) {
        if self.handle_replace(item.clone()) {
            debug!(id = %item.id(), "Created entity already present, merged");
        } else {
            debug!(id = %item.id(), "Inserting created entity");
            self.items.push(item);
        }
    }

    fn handle_replace(&mut self, item: T) -> bool {
        match self.items.iter_mut().find(|existing| existing.id() == item.id()) {
            Some(existing) => {
                debug!(id = %item.id(), "Replacing entity");
                *existing = item;
                true
            }
            None => {
                debug!(id = %item.id(), "No entity to replace");
                false
            }
        }
    }

    fn snapshot(&self) -> Snapshot<T> {
        Snapshot {
            items: self.items.clone(),
            status: *self.status.borrow(),
            last_error: self.last_error.clone(),
            query: self.query.clone(),
        }
    }
}

// =============================================================================
// 4. THE GENERIC CLIENT
// =============================================================================

#[derive(Clone)]
pub struct ResourceClient<T: Entity> {
    sender: mpsc::Sender<ResourceRequest<T>>,
    status: watch::Receiver<StoreStatus>,
}

impl<T: Entity> ResourceClient<T> {
    /// A client backed by a bare channel; the status never leaves `Idle`.
    pub fn new(sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        let (_, status) = watch::channel(StoreStatus::Idle);
        Self { sender, status }
    }

    async fn request<R>(
        &self,
        make: impl FnOnce(Response<R>) -> ResourceRequest<T>,
    ) -> Result<R, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(make(respond_to))
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn load(&self, query: Option<T::Query>) -> Result<Vec<T>, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Load { query, respond_to }).await
    }

    pub async fn refresh(&self) -> Result<RefreshOutcome, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Refresh { respond_to }).await
    }

    pub async fn insert(&self, item: T) -> Result<(), FrameworkError> {
        self.request(|respond_to| ResourceRequest::Insert { item, respond_to }).await
    }

    pub async fn replace(&self, item: T) -> Result<bool, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Replace { item, respond_to }).await
    }

    pub async fn snapshot(&self) -> Result<Snapshot<T>, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Snapshot { respond_to }).await
    }

    pub fn status(&self) -> StoreStatus {
        *self.status.borrow()
    }

    pub fn watch_status(&self) -> watch::Receiver<StoreStatus> {
        self.status.clone()
    }
}

// =============================================================================
// 5. BACKGROUND POLLING
// =============================================================================

/// Periodic background refresh of one store.
///
/// The first refresh happens one `period` after spawning. Dropping the poller
/// aborts its task; it also stops on its own once the store is gone.
pub struct Poller {
    kind: &'static str,
    handle: JoinHandle<()>,
}

impl Poller {
    pub fn spawn<T: Entity>(client: ResourceClient<T>, period: Duration) -> Self {
        let span = info_span!("poller", kind = T::KIND, period_secs = period.as_secs());
        let handle = tokio::spawn(
            async move {
                let mut ticker = interval_at(Instant::now() + period, period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

                loop {
                    ticker.tick().await;
                    match client.refresh().await {
                        Ok(RefreshOutcome::Updated(count)) => debug!(count, "Poll refreshed"),
                        Ok(RefreshOutcome::Stale(_)) => debug!("Poll kept stale collection"),
                        Err(e) => {
                            info!(error = %e, "Store gone, poller stopping");
                            break;
                        }
                    }
                }
            }
            .instrument(span),
        );
        Self { kind: T::KIND, handle }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

// =============================================================================
// 6. TESTS
// =============================================================================
