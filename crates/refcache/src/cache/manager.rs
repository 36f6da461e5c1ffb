//! Lifecycle owner of the reference cache.
//!
//! The manager loads every dataset once at startup, then keeps them coherent
//! by registering an [`InvalidationListener`] on the event bus. Shutdown
//! removes that listener again.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use refcache_core::cache::{CacheError, Loader, ManagerState, Result};
use refcache_core::dataset::DatasetKey;
use refcache_core::events::{EventBus, SubscriptionId};
use refcache_core::storage::{Actor, EntityRepository};

use super::listener::InvalidationListener;
use super::loaders::default_loaders;
use super::store::{CacheEntry, CacheStore, Snapshot};
use crate::config::Config;

/// Starts, serves and stops the reference cache.
pub struct CacheManager {
    store: CacheStore,
    loaders: Vec<Arc<dyn Loader>>,
    bus: Arc<dyn EventBus>,
    pattern: String,
    state: Mutex<ManagerState>,
    /// Serializes `start` and `shutdown`; holds the active subscription.
    lifecycle: tokio::sync::Mutex<Option<SubscriptionId>>,
}

impl CacheManager {
    /// Creates a manager for the five reference datasets backed by `repository`.
    ///
    /// Loads run as the system actor and the listener subscribes to every
    /// change topic under the configured prefix.
    pub fn new(
        repository: Arc<dyn EntityRepository>,
        bus: Arc<dyn EventBus>,
        config: &Config,
    ) -> Self {
        Self::with_loaders(
            CacheStore::new(),
            default_loaders(repository, Actor::system()),
            bus,
            config.change_pattern(),
        )
    }

    /// Creates a manager with an explicit set of loaders.
    ///
    /// Loaders run at startup in the order given. Each dataset may appear at
    /// most once; datasets without a loader are simply never cached, so the
    /// caller decides which of [`DatasetKey::ALL`] it serves.
    pub fn with_loaders(
        store: CacheStore,
        loaders: Vec<Arc<dyn Loader>>,
        bus: Arc<dyn EventBus>,
        pattern: impl Into<String>,
    ) -> Self {
        debug_assert!(
            loaders
                .iter()
                .map(|loader| loader.dataset())
                .collect::<HashSet<_>>()
                .len()
                == loaders.len(),
            "duplicate dataset loaders"
        );

        Self {
            store,
            loaders,
            bus,
            pattern: pattern.into(),
            state: Mutex::new(ManagerState::Uninitialized),
            lifecycle: tokio::sync::Mutex::new(None),
        }
    }

    pub fn state(&self) -> ManagerState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: ManagerState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }

    /// Handle to the underlying store. Clones share the same datasets.
    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    /// Returns the current snapshot for `key`, if it has been loaded.
    pub async fn read(&self, key: DatasetKey) -> Option<Snapshot> {
        self.store.read(key).await
    }

    /// Loads every dataset and starts listening for changes.
    ///
    /// Loads run one after another and the first failure aborts startup: the
    /// error is returned, no listener is registered and the manager goes back
    /// to the state it started from. Calling this while already started
    /// returns [`CacheError::InvalidState`].
    pub async fn start(&self) -> Result<()> {
        let mut subscription = self.lifecycle.lock().await;

        let previous = self.state();
        if !previous.can_start() {
            return Err(CacheError::InvalidState {
                operation: "start",
                state: previous,
            });
        }

        self.set_state(ManagerState::Starting);
        tracing::info!(datasets = self.loaders.len(), "Initializing cache manager");

        match self.load_and_listen().await {
            Ok(id) => {
                *subscription = Some(id);
                self.set_state(ManagerState::Running);
                tracing::info!(
                    subscription = %id,
                    pattern = %self.pattern,
                    "Cache manager initialized"
                );
                Ok(())
            }
            Err(err) => {
                self.set_state(previous);
                tracing::error!(error = %err, "Cache manager failed to start");
                Err(err)
            }
        }
    }

    async fn load_and_listen(&self) -> Result<SubscriptionId> {
        for loader in &self.loaders {
            let key = loader.dataset();
            let values = loader.load().await?;
            tracing::debug!(dataset = %key, len = values.len(), "Dataset loaded");
            self.store
                .write(key, CacheEntry::new(values, Arc::clone(loader)))
                .await;
        }

        let listener = Arc::new(InvalidationListener::new(self.store.clone()));
        let id = self.bus.subscribe(&self.pattern, listener.handler()).await?;
        Ok(id)
    }

    /// Stops listening for changes.
    ///
    /// Safe to call before `start` or more than once; those calls do nothing
    /// and return `true`. Returns `false` if the bus failed to remove the
    /// listener, in which case the manager stays running.
    ///
    /// While `start` is still loading this returns `false` immediately
    /// instead of waiting for the loaders.
    pub async fn shutdown(&self) -> bool {
        if self.state() == ManagerState::Starting {
            tracing::warn!("Cache manager is still starting, shutdown skipped");
            return false;
        }

        let mut subscription = self.lifecycle.lock().await;

        let Some(id) = subscription.take() else {
            tracing::debug!(
                state = %self.state(),
                "Cache manager not running, nothing to shut down"
            );
            return true;
        };

        self.set_state(ManagerState::ShuttingDown);

        match self.bus.unsubscribe(id).await {
            Ok(removed) => {
                if !removed {
                    tracing::warn!(subscription = %id, "Listener was already unsubscribed");
                }
                self.set_state(ManagerState::Stopped);
                tracing::info!("Cache manager stopped");
                true
            }
            Err(err) => {
                *subscription = Some(id);
                self.set_state(ManagerState::Running);
                tracing::error!(
                    subscription = %id,
                    error = %err,
                    "Failed to unsubscribe cache listener"
                );
                false
            }
        }
    }
}

impl std::fmt::Debug for CacheManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheManager")
            .field("state", &self.state())
            .field("pattern", &self.pattern)
            .field("loaders", &self.loaders.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use refcache_core::dataset::{DatasetItem, Entity, Rule};
    use refcache_core::events::{ChangeEvent, EventError, EventHandler};
    use uuid::Uuid;

    use crate::events::MemoryEventBus;
    use crate::storage::inmemory::InMemoryRepository;

    const PREFIX: &str = "platform_";

    /// Wraps a loader, counting calls and recording the global call order.
    struct CountingLoader {
        inner: Arc<dyn Loader>,
        calls: AtomicUsize,
        order: Arc<Mutex<Vec<DatasetKey>>>,
    }

    #[async_trait]
    impl Loader for CountingLoader {
        fn dataset(&self) -> DatasetKey {
            self.inner.dataset()
        }

        async fn load(&self) -> Result<Vec<DatasetItem>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.order.lock().unwrap().push(self.dataset());
            self.inner.load().await
        }
    }

    struct Harness {
        repository: Arc<InMemoryRepository>,
        bus: Arc<MemoryEventBus>,
        loaders: Vec<Arc<CountingLoader>>,
        order: Arc<Mutex<Vec<DatasetKey>>>,
        manager: CacheManager,
    }

    impl Harness {
        fn new() -> Self {
            Self::with_bus(Arc::new(MemoryEventBus::new()))
        }

        fn with_bus(bus: Arc<MemoryEventBus>) -> Self {
            let repository = Arc::new(InMemoryRepository::new());
            let order = Arc::new(Mutex::new(Vec::new()));
            let loaders: Vec<Arc<CountingLoader>> =
                default_loaders(repository.clone(), Actor::system())
                    .into_iter()
                    .map(|inner| {
                        Arc::new(CountingLoader {
                            inner,
                            calls: AtomicUsize::new(0),
                            order: order.clone(),
                        })
                    })
                    .collect();
            let manager = CacheManager::with_loaders(
                CacheStore::new(),
                loaders
                    .iter()
                    .map(|loader| loader.clone() as Arc<dyn Loader>)
                    .collect(),
                bus.clone(),
                format!("{}*", PREFIX),
            );
            Self {
                repository,
                bus,
                loaders,
                order,
                manager,
            }
        }

        fn calls(&self, key: DatasetKey) -> usize {
            self.loaders
                .iter()
                .find(|loader| loader.dataset() == key)
                .map(|loader| loader.calls.load(Ordering::SeqCst))
                .unwrap_or(0)
        }

        async fn publish(&self, event: ChangeEvent) {
            self.bus.publish(&event.topic(PREFIX), &event).await.unwrap();
        }
    }

    async fn wait_until<F: Fn() -> bool>(condition: F) {
        tokio::time::timeout(Duration::from_secs(1), async {
            while !condition() {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .expect("condition should become true");
    }

    #[tokio::test]
    async fn test_start_loads_every_dataset_in_order() {
        let harness = Harness::new();

        harness.manager.start().await.unwrap();

        assert_eq!(harness.manager.state(), ManagerState::Running);
        assert_eq!(*harness.order.lock().unwrap(), DatasetKey::ALL.to_vec());
        for key in DatasetKey::ALL {
            assert!(harness.manager.read(key).await.is_some(), "{} missing", key);
            assert_eq!(harness.calls(key), 1);
        }
        assert_eq!(harness.bus.subscription_count().await, 1);
    }

    #[tokio::test]
    async fn test_start_caches_every_loader_output() {
        let harness = Harness::new();
        crate::mock_data::seed_repository(&harness.repository).await;

        harness.manager.start().await.unwrap();

        for loader in &harness.loaders {
            let key = loader.dataset();
            let expected = loader.inner.load().await.unwrap();
            assert!(!expected.is_empty(), "{} seeded", key);
            assert_eq!(*harness.manager.read(key).await.unwrap(), expected, "{}", key);
        }
    }

    #[tokio::test]
    async fn test_start_caches_loader_output() {
        let harness = Harness::new();
        let rule = Rule::new("Attribution propagation", true);
        harness.repository.upsert(Entity::Rule(rule.clone())).await;

        harness.manager.start().await.unwrap();

        assert_eq!(
            *harness.manager.read(DatasetKey::Rule).await.unwrap(),
            vec![DatasetItem::Rule(rule.clone())]
        );
        assert_eq!(harness.manager.store().rules().await, vec![rule]);
    }

    #[tokio::test]
    async fn test_start_fails_fast() {
        let harness = Harness::new();
        harness
            .repository
            .fail_with(refcache_core::storage::RepositoryError::ConnectionFailed(
                "down".to_string(),
            ))
            .await;

        let error = harness.manager.start().await.unwrap_err();

        assert!(matches!(
            error,
            CacheError::LoadFailed {
                dataset: DatasetKey::WorkflowStatus,
                ..
            }
        ));
        assert_eq!(harness.manager.state(), ManagerState::Uninitialized);
        assert_eq!(*harness.order.lock().unwrap(), vec![DatasetKey::WorkflowStatus]);
        assert_eq!(harness.bus.subscription_count().await, 0);
    }

    #[tokio::test]
    async fn test_failed_start_can_be_retried() {
        let harness = Harness::new();
        harness
            .repository
            .fail_with(refcache_core::storage::RepositoryError::QueryFailed(
                "timeout".to_string(),
            ))
            .await;
        assert!(harness.manager.start().await.is_err());

        harness.repository.recover().await;
        harness.manager.start().await.unwrap();

        assert_eq!(harness.manager.state(), ManagerState::Running);
        assert_eq!(harness.bus.subscription_count().await, 1);
    }

    #[tokio::test]
    async fn test_double_start_is_rejected() {
        let harness = Harness::new();
        harness.manager.start().await.unwrap();

        let error = harness.manager.start().await.unwrap_err();

        assert_eq!(
            error,
            CacheError::InvalidState {
                operation: "start",
                state: ManagerState::Running,
            }
        );
        assert_eq!(harness.bus.subscription_count().await, 1);
        assert_eq!(harness.calls(DatasetKey::Rule), 1);
    }

    #[tokio::test]
    async fn test_concurrent_start_registers_one_listener() {
        let harness = Harness::new();

        let (first, second) = tokio::join!(harness.manager.start(), harness.manager.start());

        assert!(first.is_ok() != second.is_ok());
        assert_eq!(harness.bus.subscription_count().await, 1);
    }

    #[tokio::test]
    async fn test_change_event_reloads_dataset() {
        let harness = Harness::new();
        harness.manager.start().await.unwrap();
        assert!(harness.manager.store().rules().await.is_empty());

        let rule = Rule::new("Report expansion", true);
        harness.repository.upsert(Entity::Rule(rule.clone())).await;
        harness.publish(ChangeEvent::created("Rule", rule.id)).await;

        wait_until(|| harness.calls(DatasetKey::Rule) == 2).await;
        tokio::time::timeout(Duration::from_secs(1), async {
            while harness.manager.store().rules().await.is_empty() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();

        assert_eq!(harness.manager.store().rules().await, vec![rule]);
        assert_eq!(harness.calls(DatasetKey::Settings), 1);
    }

    #[tokio::test]
    async fn test_status_event_reloads_workflow_statuses() {
        let harness = Harness::new();
        harness.manager.start().await.unwrap();

        harness
            .publish(ChangeEvent::updated("Status", Uuid::nil()))
            .await;

        wait_until(|| harness.calls(DatasetKey::WorkflowStatus) == 2).await;
    }

    #[tokio::test]
    async fn test_untracked_events_do_not_reload() {
        let harness = Harness::new();
        harness.manager.start().await.unwrap();

        harness
            .publish(ChangeEvent::updated("Report", Uuid::nil()))
            .await;
        harness
            .publish(ChangeEvent::updated("StatusTemplate", Uuid::nil()))
            .await;
        tokio::time::sleep(Duration::from_millis(20)).await;

        for key in DatasetKey::ALL {
            assert_eq!(harness.calls(key), 1);
        }
    }

    #[tokio::test]
    async fn test_end_to_end_scenario() {
        let harness = Harness::new();
        harness.manager.start().await.unwrap();
        assert!(harness
            .manager
            .read(DatasetKey::Rule)
            .await
            .unwrap()
            .is_empty());

        let rule = Rule::new("Location propagation", true);
        harness.repository.upsert(Entity::Rule(rule.clone())).await;
        harness.publish(ChangeEvent::updated("Rule", rule.id)).await;
        wait_until(|| harness.calls(DatasetKey::Rule) == 2).await;
        tokio::time::timeout(Duration::from_secs(1), async {
            while harness.manager.store().rules().await.len() != 1 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();

        assert!(harness.manager.shutdown().await);
        assert_eq!(harness.manager.state(), ManagerState::Stopped);

        harness
            .repository
            .upsert(Entity::Rule(Rule::new("Ignored", true)))
            .await;
        harness.publish(ChangeEvent::created("Rule", Uuid::nil())).await;
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(harness.calls(DatasetKey::Rule), 2);
        assert_eq!(harness.manager.store().rules().await, vec![rule]);
    }

    #[tokio::test]
    async fn test_shutdown_before_start() {
        let harness = Harness::new();

        assert!(harness.manager.shutdown().await);
        assert_eq!(harness.manager.state(), ManagerState::Uninitialized);
    }

    #[tokio::test]
    async fn test_shutdown_is_idempotent() {
        let harness = Harness::new();
        harness.manager.start().await.unwrap();

        assert!(harness.manager.shutdown().await);
        assert!(harness.manager.shutdown().await);
        assert_eq!(harness.manager.state(), ManagerState::Stopped);
        assert_eq!(harness.bus.subscription_count().await, 0);
    }

    #[tokio::test]
    async fn test_restart_after_shutdown() {
        let harness = Harness::new();
        harness.manager.start().await.unwrap();
        assert!(harness.manager.shutdown().await);

        harness.manager.start().await.unwrap();

        assert_eq!(harness.manager.state(), ManagerState::Running);
        assert_eq!(harness.bus.subscription_count().await, 1);
        assert_eq!(harness.calls(DatasetKey::Connector), 2);
    }

    /// Loader that parks until released.
    struct GatedLoader {
        entered: tokio::sync::Notify,
        release: tokio::sync::Notify,
    }

    #[async_trait]
    impl Loader for GatedLoader {
        fn dataset(&self) -> DatasetKey {
            DatasetKey::Settings
        }

        async fn load(&self) -> Result<Vec<DatasetItem>> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_shutdown_during_start_returns_immediately() {
        let loader = Arc::new(GatedLoader {
            entered: tokio::sync::Notify::new(),
            release: tokio::sync::Notify::new(),
        });
        let bus = Arc::new(MemoryEventBus::new());
        let manager = Arc::new(CacheManager::with_loaders(
            CacheStore::new(),
            vec![loader.clone() as Arc<dyn Loader>],
            bus.clone(),
            "platform_*",
        ));

        let starting = tokio::spawn({
            let manager = manager.clone();
            async move { manager.start().await }
        });
        loader.entered.notified().await;

        let stopped = tokio::time::timeout(Duration::from_secs(1), manager.shutdown())
            .await
            .expect("shutdown should not wait for a hung loader");
        assert!(!stopped);
        assert_eq!(manager.state(), ManagerState::Starting);

        loader.release.notify_one();
        starting.await.unwrap().unwrap();
        assert!(manager.shutdown().await);
        assert_eq!(bus.subscription_count().await, 0);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "duplicate dataset loaders")]
    fn test_duplicate_loaders_rejected() {
        let repository: Arc<dyn EntityRepository> = Arc::new(InMemoryRepository::new());
        let mut loaders = default_loaders(repository.clone(), Actor::system());
        loaders.extend(default_loaders(repository, Actor::system()));

        CacheManager::with_loaders(
            CacheStore::new(),
            loaders,
            Arc::new(MemoryEventBus::new()),
            "platform_*",
        );
    }

    /// Bus whose unsubscribe always fails.
    struct StuckBus {
        inner: MemoryEventBus,
    }

    #[async_trait]
    impl EventBus for StuckBus {
        async fn publish(
            &self,
            topic: &str,
            event: &ChangeEvent,
        ) -> refcache_core::events::Result<()> {
            self.inner.publish(topic, event).await
        }

        async fn subscribe(
            &self,
            pattern: &str,
            handler: EventHandler,
        ) -> refcache_core::events::Result<SubscriptionId> {
            self.inner.subscribe(pattern, handler).await
        }

        async fn unsubscribe(&self, _id: SubscriptionId) -> refcache_core::events::Result<bool> {
            Err(EventError::SubscriptionFailed("bus unreachable".to_string()))
        }
    }

    #[tokio::test]
    async fn test_failed_unsubscribe_keeps_running() {
        let manager = CacheManager::with_loaders(
            CacheStore::new(),
            Vec::new(),
            Arc::new(StuckBus {
                inner: MemoryEventBus::new(),
            }),
            "platform_*",
        );
        manager.start().await.unwrap();

        assert!(!manager.shutdown().await);
        assert_eq!(manager.state(), ManagerState::Running);
    }

    #[tokio::test]
    async fn test_new_uses_configured_prefix() {
        let bus = Arc::new(MemoryEventBus::new());
        let repository = Arc::new(InMemoryRepository::new());
        let config = Config {
            topic_prefix: "tenant_".to_string(),
            event_capacity: 16,
        };
        let manager = CacheManager::new(repository.clone(), bus.clone(), &config);
        manager.start().await.unwrap();

        let rule = Rule::new("Tenant rule", true);
        repository.upsert(Entity::Rule(rule.clone())).await;
        let event = ChangeEvent::updated("Rule", rule.id);
        bus.publish(&event.topic("tenant_"), &event).await.unwrap();

        tokio::time::timeout(Duration::from_secs(1), async {
            while manager.store().rules().await.is_empty() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("tenant topic should trigger a reload");
    }
}
