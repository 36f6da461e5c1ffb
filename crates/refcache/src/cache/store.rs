//! Keyed in-memory store of reference datasets.
//!
//! Each dataset key maps to a [`CacheEntry`] holding an immutable snapshot of
//! values and the loader that can recompute it. Entries are only ever replaced
//! whole: the lock is held for the pointer swap, never across a loader call,
//! so readers always get the last committed snapshot without waiting on an
//! in-flight reload.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use refcache_core::cache::{Loader, Result};
use refcache_core::dataset::{
    dataset_for_entity_type, Connector, DatasetItem, DatasetKey, MarkingDefinition, Rule,
    Settings, Tracking, WorkflowStatusView,
};

/// Immutable snapshot of one dataset.
pub type Snapshot = Arc<Vec<DatasetItem>>;

/// Cached values for one dataset paired with the loader that produced them.
#[derive(Clone)]
pub struct CacheEntry {
    values: Snapshot,
    loader: Arc<dyn Loader>,
}

impl CacheEntry {
    /// Creates an entry from freshly loaded values.
    pub fn new(values: Vec<DatasetItem>, loader: Arc<dyn Loader>) -> Self {
        Self {
            values: Arc::new(values),
            loader,
        }
    }

    /// Returns the cached snapshot.
    pub fn values(&self) -> Snapshot {
        Arc::clone(&self.values)
    }

    /// Returns the loader bound to this entry.
    pub fn loader(&self) -> Arc<dyn Loader> {
        Arc::clone(&self.loader)
    }
}

impl std::fmt::Debug for CacheEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheEntry")
            .field("dataset", &self.loader.dataset())
            .field("len", &self.values.len())
            .finish()
    }
}

/// Process-local table of cached reference datasets.
///
/// Cloning is cheap and every clone shares the same table. Create one with
/// [`CacheStore::new`]; it is torn down when the last clone is dropped.
#[derive(Debug, Clone, Default)]
pub struct CacheStore {
    entries: Arc<RwLock<HashMap<DatasetKey, CacheEntry>>>,
}

impl CacheStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the entry for `key`.
    pub async fn write(&self, key: DatasetKey, entry: CacheEntry) {
        let len = entry.values.len();
        let mut entries = self.entries.write().await;
        entries.insert(key, entry);
        tracing::trace!(dataset = %key, len, "Cache entry written");
    }

    /// Returns the current snapshot for `key`, or `None` if it was never written.
    pub async fn read(&self, key: DatasetKey) -> Option<Snapshot> {
        let entries = self.entries.read().await;
        entries.get(&key).map(CacheEntry::values)
    }

    /// Reloads `key` through its stored loader and replaces the entry.
    ///
    /// Returns `Ok(false)` without doing anything when `key` has no entry.
    /// On loader failure the error is returned and the previous entry stays
    /// in place.
    pub async fn invalidate(&self, key: DatasetKey) -> Result<bool> {
        let loader = {
            let entries = self.entries.read().await;
            match entries.get(&key) {
                Some(entry) => entry.loader(),
                None => return Ok(false),
            }
        };

        let values = loader.load().await?;
        self.write(key, CacheEntry::new(values, loader)).await;
        Ok(true)
    }

    /// Invalidates the dataset backed by `entity_type`, if any.
    pub async fn invalidate_entity_type(&self, entity_type: &str) -> Result<bool> {
        match dataset_for_entity_type(entity_type) {
            Tracking::Tracked(key) => self.invalidate(key).await,
            Tracking::Untracked => Ok(false),
        }
    }

    /// Returns the datasets that currently hold an entry, in startup order.
    pub async fn datasets(&self) -> Vec<DatasetKey> {
        let entries = self.entries.read().await;
        DatasetKey::ALL
            .into_iter()
            .filter(|key| entries.contains_key(key))
            .collect()
    }

    /// Cached workflow statuses, in `order` sequence.
    pub async fn workflow_statuses(&self) -> Vec<WorkflowStatusView> {
        self.collect(DatasetKey::WorkflowStatus, |item| match item {
            DatasetItem::WorkflowStatus(view) => Some(view.clone()),
            _ => None,
        })
        .await
    }

    /// Cached connectors.
    pub async fn connectors(&self) -> Vec<Connector> {
        self.collect(DatasetKey::Connector, |item| match item {
            DatasetItem::Connector(connector) => Some(connector.clone()),
            _ => None,
        })
        .await
    }

    /// Cached rules.
    pub async fn rules(&self) -> Vec<Rule> {
        self.collect(DatasetKey::Rule, |item| match item {
            DatasetItem::Rule(rule) => Some(rule.clone()),
            _ => None,
        })
        .await
    }

    /// Cached marking definitions.
    pub async fn marking_definitions(&self) -> Vec<MarkingDefinition> {
        self.collect(DatasetKey::MarkingDefinition, |item| match item {
            DatasetItem::MarkingDefinition(marking) => Some(marking.clone()),
            _ => None,
        })
        .await
    }

    /// The cached platform settings, if loaded.
    pub async fn settings(&self) -> Option<Settings> {
        self.collect(DatasetKey::Settings, |item| match item {
            DatasetItem::Settings(settings) => Some(settings.clone()),
            _ => None,
        })
        .await
        .into_iter()
        .next()
    }

    async fn collect<T>(
        &self,
        key: DatasetKey,
        project: impl Fn(&DatasetItem) -> Option<T>,
    ) -> Vec<T> {
        match self.read(key).await {
            Some(snapshot) => snapshot.iter().filter_map(project).collect(),
            None => Vec::new(),
        }
    }
}
