//! Change-event listener that keeps the cache coherent.
//!
//! The listener is registered once on a wildcard topic, so it sees changes for
//! every entity type. Filtering happens here through the pure mapping in
//! `refcache_core::dataset`, independent of the bus transport.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use refcache_core::dataset::{dataset_for_entity_type, DatasetKey, Tracking};
use refcache_core::events::{ChangeEvent, EventHandler};

use super::store::CacheStore;

/// Reloads cached datasets in response to change events.
///
/// Reloads are spawned on the runtime the listener was created in, so the
/// handler may be called from any thread.
#[derive(Debug, Clone)]
pub struct InvalidationListener {
    store: CacheStore,
    runtime: Handle,
}

impl InvalidationListener {
    /// Creates a listener bound to the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn new(store: CacheStore) -> Self {
        Self::with_runtime(store, Handle::current())
    }

    /// Creates a listener that spawns reloads on `runtime`.
    pub fn with_runtime(store: CacheStore, runtime: Handle) -> Self {
        Self { store, runtime }
    }

    /// Returns a bus handler that forwards every event to [`Self::on_event`].
    ///
    /// The handler only spawns work and returns immediately.
    pub fn handler(self: Arc<Self>) -> EventHandler {
        Arc::new(move |event: ChangeEvent| {
            self.on_event(&event);
        })
    }

    /// Triggers a reload for the dataset backed by the event's entity type.
    ///
    /// Returns the supervising task, or `None` if the entity type is not
    /// cached. The reload is never awaited here.
    pub fn on_event(&self, event: &ChangeEvent) -> Option<JoinHandle<()>> {
        match dataset_for_entity_type(event.entity_type()) {
            Tracking::Tracked(key) => {
                tracing::debug!(
                    dataset = %key,
                    action = ?event.action,
                    "Change event received, reloading dataset"
                );
                Some(self.runtime.spawn(supervise_reload(
                    self.runtime.clone(),
                    self.store.clone(),
                    key,
                )))
            }
            Tracking::Untracked => {
                tracing::trace!(entity_type = event.entity_type(), "Ignoring untracked change");
                None
            }
        }
    }
}

/// Runs one reload in its own task and logs how it ended.
///
/// Loader errors and panics stop here; the previous snapshot stays visible.
async fn supervise_reload(runtime: Handle, store: CacheStore, key: DatasetKey) {
    let reload = runtime.spawn(async move { store.invalidate(key).await });

    match reload.await {
        Ok(Ok(true)) => tracing::debug!(dataset = %key, "Dataset reloaded"),
        Ok(Ok(false)) => {
            tracing::debug!(dataset = %key, "Dataset not cached, nothing to reload")
        }
        Ok(Err(err)) => tracing::warn!(
            dataset = %key,
            error = %err,
            "Dataset reload failed, keeping previous snapshot"
        ),
        Err(err) => tracing::error!(
            dataset = %key,
            error = %err,
            "Dataset reload task panicked or was cancelled"
        ),
    }
}
