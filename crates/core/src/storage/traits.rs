use async_trait::async_trait;

use crate::dataset::{Connector, Entity};

use super::{Actor, ListOptions, Result};

/// Read access to the authoritative store of reference entities.
///
/// The cache only ever reads through this trait; persistence lives elsewhere.
#[async_trait]
pub trait EntityRepository: Send + Sync {
    /// Lists every entity whose type is one of `entity_types`, ordered per `options`.
    async fn list_entities(
        &self,
        actor: &Actor,
        entity_types: &[&str],
        options: ListOptions,
    ) -> Result<Vec<Entity>>;

    /// Lists every registered connector.
    async fn connectors(&self, actor: &Actor) -> Result<Vec<Connector>>;
}
