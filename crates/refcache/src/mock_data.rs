//! Demo reference data for the in-memory repository.

use chrono::{Duration, Utc};
use refcache_core::dataset::{
    Connector, Entity, MarkingDefinition, Rule, Settings, Status, StatusTemplate,
    ENTITY_TYPE_RULE,
};
use refcache_core::events::ChangeEvent;

use crate::storage::inmemory::InMemoryRepository;

/// Seeds `repository` with a small but complete set of reference data.
///
/// One status points at a template that does not exist, so the workflow
/// dataset shows the fallback name.
pub async fn seed_repository(repository: &InMemoryRepository) {
    let new = StatusTemplate::new("NEW", "#ff9800");
    let in_progress = StatusTemplate::new("IN_PROGRESS", "#5c7bf5");
    let closed = StatusTemplate::new("CLOSED", "#616161");

    for (order, template) in [&new, &in_progress, &closed].into_iter().enumerate() {
        repository
            .upsert(Entity::Status(Status::new(template.id, "Report", order as i32)))
            .await;
    }
    repository
        .upsert(Entity::Status(Status::new(
            uuid::Uuid::new_v4(),
            "Incident",
            0,
        )))
        .await;
    for template in [new, in_progress, closed] {
        repository.upsert(Entity::StatusTemplate(template)).await;
    }

    let mut import = Connector::new("ImportFileStix", "INTERNAL_IMPORT_FILE")
        .with_scope(["application/json", "text/xml"])
        .with_auto(true);
    import.updated_at = Some(Utc::now() - Duration::minutes(5));
    repository.upsert_connector(import).await;
    repository
        .upsert_connector(
            Connector::new("ExportFileCsv", "INTERNAL_EXPORT_FILE").with_scope(["text/csv"]),
        )
        .await;

    for (name, active) in [
        ("Attribution propagation", true),
        ("Location propagation", false),
    ] {
        repository.upsert(Entity::Rule(Rule::new(name, active))).await;
    }

    for (order, (definition, color)) in [
        ("TLP:CLEAR", "#ffffff"),
        ("TLP:GREEN", "#2e7d32"),
        ("TLP:AMBER", "#d84315"),
        ("TLP:RED", "#c62828"),
    ]
    .into_iter()
    .enumerate()
    {
        repository
            .upsert(Entity::MarkingDefinition(MarkingDefinition::new(
                "TLP",
                definition,
                order as i32,
                color,
            )))
            .await;
    }

    repository
        .upsert(Entity::Settings(Settings::new(
            "Reference Platform",
            "admin@example.com",
        )))
        .await;
}

/// Adds a new rule and returns the change event announcing it.
pub async fn add_demo_rule(repository: &InMemoryRepository) -> ChangeEvent {
    let rule = Rule::new("Observable relationship propagation", true);
    let event = ChangeEvent::created(ENTITY_TYPE_RULE, rule.id);
    repository.upsert(Entity::Rule(rule)).await;
    event
}

#[cfg(test)]
mod tests {
    use super::*;
    use refcache_core::dataset::ENTITY_TYPE_STATUS;
    use refcache_core::storage::{Actor, EntityRepository, ListOptions};

    #[tokio::test]
    async fn test_seed_covers_every_dataset() {
        let repository = InMemoryRepository::new();
        seed_repository(&repository).await;
        let actor = Actor::system();

        let statuses = repository
            .list_entities(&actor, &[ENTITY_TYPE_STATUS], ListOptions::default())
            .await
            .unwrap();
        assert_eq!(statuses.len(), 4);
        assert_eq!(repository.connectors(&actor).await.unwrap().len(), 2);
        let rules = repository
            .list_entities(&actor, &[ENTITY_TYPE_RULE], ListOptions::default())
            .await
            .unwrap();
        assert_eq!(rules.len(), 2);
    }

    #[tokio::test]
    async fn test_add_demo_rule() {
        let repository = InMemoryRepository::new();
        let event = add_demo_rule(&repository).await;

        assert_eq!(event.entity_type(), "Rule");
        let rules = repository
            .list_entities(&Actor::system(), &[ENTITY_TYPE_RULE], ListOptions::default())
            .await
            .unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(Some(rules[0].id()), event.instance.id);
    }
}
