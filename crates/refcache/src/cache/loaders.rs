//! Authoritative reload operations, one per dataset.

use std::sync::Arc;

use async_trait::async_trait;

use refcache_core::cache::{CacheError, Loader, Result};
use refcache_core::dataset::{
    resolve_workflow_statuses, DatasetItem, DatasetKey, Entity, ENTITY_TYPE_STATUS,
    ENTITY_TYPE_STATUS_TEMPLATE,
};
use refcache_core::storage::{Actor, EntityRepository, ListOptions, OrderField};

/// Loads workflow statuses joined with their template names.
///
/// Statuses are listed in ascending `order`; the join against templates is
/// recomputed on every load.
pub struct WorkflowStatusLoader {
    repository: Arc<dyn EntityRepository>,
    actor: Actor,
}

impl WorkflowStatusLoader {
    pub fn new(repository: Arc<dyn EntityRepository>, actor: Actor) -> Self {
        Self { repository, actor }
    }
}

#[async_trait]
impl Loader for WorkflowStatusLoader {
    fn dataset(&self) -> DatasetKey {
        DatasetKey::WorkflowStatus
    }

    async fn load(&self) -> Result<Vec<DatasetItem>> {
        let dataset = self.dataset();

        let templates = self
            .repository
            .list_entities(
                &self.actor,
                &[ENTITY_TYPE_STATUS_TEMPLATE],
                ListOptions::default(),
            )
            .await
            .map_err(|e| CacheError::load_failed(dataset, e))?
            .into_iter()
            .filter_map(|entity| match entity {
                Entity::StatusTemplate(template) => Some(template),
                _ => None,
            })
            .collect::<Vec<_>>();

        let statuses = self
            .repository
            .list_entities(
                &self.actor,
                &[ENTITY_TYPE_STATUS],
                ListOptions::order_by(OrderField::Order),
            )
            .await
            .map_err(|e| CacheError::load_failed(dataset, e))?
            .into_iter()
            .filter_map(|entity| match entity {
                Entity::Status(status) => Some(status),
                _ => None,
            })
            .collect();

        Ok(resolve_workflow_statuses(&templates, statuses)
            .into_iter()
            .map(DatasetItem::WorkflowStatus)
            .collect())
    }
}

/// Loads every registered connector.
pub struct ConnectorLoader {
    repository: Arc<dyn EntityRepository>,
    actor: Actor,
}

impl ConnectorLoader {
    pub fn new(repository: Arc<dyn EntityRepository>, actor: Actor) -> Self {
        Self { repository, actor }
    }
}

#[async_trait]
impl Loader for ConnectorLoader {
    fn dataset(&self) -> DatasetKey {
        DatasetKey::Connector
    }

    async fn load(&self) -> Result<Vec<DatasetItem>> {
        let connectors = self
            .repository
            .connectors(&self.actor)
            .await
            .map_err(|e| CacheError::load_failed(self.dataset(), e))?;
        Ok(connectors.into_iter().map(DatasetItem::Connector).collect())
    }
}

/// Loads a passthrough dataset through the generic entity listing.
///
/// Used for rules, marking definitions and settings, which are cached as
/// returned without joins or ordering.
pub struct EntityListLoader {
    dataset: DatasetKey,
    repository: Arc<dyn EntityRepository>,
    actor: Actor,
}

impl EntityListLoader {
    /// Creates a loader for `dataset`, listing entities of its entity type.
    pub fn new(dataset: DatasetKey, repository: Arc<dyn EntityRepository>, actor: Actor) -> Self {
        Self {
            dataset,
            repository,
            actor,
        }
    }
}

#[async_trait]
impl Loader for EntityListLoader {
    fn dataset(&self) -> DatasetKey {
        self.dataset
    }

    async fn load(&self) -> Result<Vec<DatasetItem>> {
        let entities = self
            .repository
            .list_entities(
                &self.actor,
                &[self.dataset.entity_type()],
                ListOptions::default(),
            )
            .await
            .map_err(|e| CacheError::load_failed(self.dataset, e))?;

        Ok(entities
            .into_iter()
            .filter_map(DatasetItem::from_entity)
            .filter(|item| item.dataset() == self.dataset)
            .collect())
    }
}

/// Builds the five loaders in startup order.
pub fn default_loaders(
    repository: Arc<dyn EntityRepository>,
    actor: Actor,
) -> Vec<Arc<dyn Loader>> {
    vec![
        Arc::new(WorkflowStatusLoader::new(repository.clone(), actor.clone())),
        Arc::new(ConnectorLoader::new(repository.clone(), actor.clone())),
        Arc::new(EntityListLoader::new(
            DatasetKey::Rule,
            repository.clone(),
            actor.clone(),
        )),
        Arc::new(EntityListLoader::new(
            DatasetKey::MarkingDefinition,
            repository.clone(),
            actor.clone(),
        )),
        Arc::new(EntityListLoader::new(DatasetKey::Settings, repository, actor)),
    ]
}
