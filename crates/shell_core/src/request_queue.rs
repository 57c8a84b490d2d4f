use std::{
    collections::HashMap,
    fmt,
    future::Future,
    sync::{Arc, Mutex, MutexGuard},
};

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{oneshot, Notify};
use tracing::debug;
use uuid::Uuid;

/// Opaque id assigned to every in-flight request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Mints a fresh id. Queue implementations assign one per issued
    /// request.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Snapshot view of one tracked request as seen by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackedRequest {
    pub id: RequestId,
    pub cancel_when_route_change: bool,
}

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("request {0} was canceled by a route change")]
    Canceled(RequestId),
}

/// The ledger contract the navigation coordinator consumes. It never looks
/// at request bodies, only at ids and route-scoping metadata.
#[async_trait]
pub trait RequestQueue: Send + Sync {
    async fn snapshot(&self) -> Vec<TrackedRequest>;

    /// Resolves once every named request has been aborted or has otherwise
    /// settled. Ids no longer present count as already settled.
    async fn cancel(&self, ids: &[RequestId]) -> Result<()>;
}

struct TrackedEntry {
    cancel_when_route_change: bool,
    cancel_tx: Option<oneshot::Sender<()>>,
}

/// In-process ledger of outstanding requests. Callers register with
/// [`InFlightQueue::track`] before issuing a request; the returned guard
/// settles the entry when dropped.
#[derive(Default)]
pub struct InFlightQueue {
    entries: Mutex<HashMap<RequestId, TrackedEntry>>,
    settled: Notify,
}

impl InFlightQueue {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<RequestId, TrackedEntry>> {
        // The map is only touched for short synchronous operations, so a
        // poisoned lock can safely hand back its inner state.
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Registers a new in-flight request and returns the guard that owns
    /// its ledger entry.
    pub fn track(self: &Arc<Self>, cancel_when_route_change: bool) -> RequestGuard {
        let id = RequestId::new();
        let (cancel_tx, cancel_rx) = oneshot::channel();
        self.entries().insert(
            id,
            TrackedEntry {
                cancel_when_route_change,
                cancel_tx: Some(cancel_tx),
            },
        );
        debug!(request_id = %id, route_scoped = cancel_when_route_change, "tracking request");
        RequestGuard {
            id,
            queue: Arc::clone(self),
            cancel_rx,
        }
    }

    fn settle(&self, id: RequestId) {
        if self.entries().remove(&id).is_some() {
            debug!(request_id = %id, "request settled");
            self.settled.notify_waiters();
        }
    }
}

#[async_trait]
impl RequestQueue for InFlightQueue {
    async fn snapshot(&self) -> Vec<TrackedRequest> {
        self.entries()
            .iter()
            .map(|(id, entry)| TrackedRequest {
                id: *id,
                cancel_when_route_change: entry.cancel_when_route_change,
            })
            .collect()
    }

    async fn cancel(&self, ids: &[RequestId]) -> Result<()> {
        {
            let mut entries = self.entries();
            for id in ids {
                if let Some(entry) = entries.get_mut(id) {
                    if let Some(tx) = entry.cancel_tx.take() {
                        let _ = tx.send(());
                    }
                }
            }
        }

        // Wait until every named request has left the ledger, whichever way
        // it settled.
        loop {
            let notified = self.settled.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let entries = self.entries();
                if ids.iter().all(|id| !entries.contains_key(id)) {
                    return Ok(());
                }
            }

            notified.await;
        }
    }
}

/// Owner-side handle for one ledger entry. Dropping the guard settles the
/// request; [`RequestGuard::run`] races the request future against
/// cancellation.
pub struct RequestGuard {
    id: RequestId,
    queue: Arc<InFlightQueue>,
    cancel_rx: oneshot::Receiver<()>,
}

impl RequestGuard {
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// Drives `fut` to completion unless the request is canceled first, in
    /// which case the outcome is [`RequestError::Canceled`]. The entry is
    /// settled on every exit path.
    pub async fn run<T, F>(mut self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::select! {
            res = fut => res,
            _ = &mut self.cancel_rx => {
                debug!(request_id = %self.id, "request aborted by cancellation");
                Err(RequestError::Canceled(self.id).into())
            }
        }
    }
}

impl Drop for RequestGuard {
    fn drop(&mut self) {
        self.queue.settle(self.id);
    }
}
