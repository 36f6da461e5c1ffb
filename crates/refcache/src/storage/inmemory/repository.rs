//! In-memory repository implementation.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use refcache_core::dataset::{Connector, Entity};
use refcache_core::storage::{Actor, EntityRepository, ListOptions, RepositoryError, Result};

/// In-memory storage backend for testing.
///
/// Entities keep insertion order, so unordered listings are deterministic.
/// A failure can be injected to simulate an unavailable data layer.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    entities: Arc<RwLock<Vec<Entity>>>,
    connectors: Arc<RwLock<Vec<Connector>>>,
    failure: Arc<RwLock<Option<RepositoryError>>>,
}

impl InMemoryRepository {
    /// Creates a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `entity`, replacing any existing entity with the same ID.
    pub async fn upsert(&self, entity: Entity) {
        let mut entities = self.entities.write().await;
        match entities.iter_mut().find(|e| e.id() == entity.id()) {
            Some(existing) => *existing = entity,
            None => entities.push(entity),
        }
    }

    /// Inserts `connector`, replacing any existing connector with the same ID.
    pub async fn upsert_connector(&self, connector: Connector) {
        let mut connectors = self.connectors.write().await;
        match connectors.iter_mut().find(|c| c.id == connector.id) {
            Some(existing) => *existing = connector,
            None => connectors.push(connector),
        }
    }

    /// Makes every subsequent read fail with `error`.
    pub async fn fail_with(&self, error: RepositoryError) {
        *self.failure.write().await = Some(error);
    }

    /// Clears an injected failure.
    pub async fn recover(&self) {
        *self.failure.write().await = None;
    }

    async fn check_failure(&self) -> Result<()> {
        match self.failure.read().await.as_ref() {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl EntityRepository for InMemoryRepository {
    async fn list_entities(
        &self,
        actor: &Actor,
        entity_types: &[&str],
        options: ListOptions,
    ) -> Result<Vec<Entity>> {
        self.check_failure().await?;
        tracing::trace!(actor = %actor.name, ?entity_types, "Listing entities");

        let entities = self.entities.read().await;
        let mut matching: Vec<Entity> = entities
            .iter()
            .filter(|e| entity_types.contains(&e.entity_type()))
            .cloned()
            .collect();
        matching.sort_by(|a, b| options.compare(a, b));
        Ok(matching)
    }

    async fn connectors(&self, _actor: &Actor) -> Result<Vec<Connector>> {
        self.check_failure().await?;
        let connectors = self.connectors.read().await;
        Ok(connectors.clone())
    }
}
