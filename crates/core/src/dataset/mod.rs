mod keys;
mod types;
mod workflow;

pub use keys::{
    dataset_for_entity_type, DatasetKey, Tracking, ENTITY_TYPE_CONNECTOR,
    ENTITY_TYPE_MARKING_DEFINITION, ENTITY_TYPE_RULE, ENTITY_TYPE_SETTINGS, ENTITY_TYPE_STATUS,
    ENTITY_TYPE_STATUS_TEMPLATE,
};
pub use types::{
    Connector, DatasetItem, Entity, MarkingDefinition, Rule, Settings, Status, StatusTemplate,
    WorkflowStatusView,
};
pub use workflow::{resolve_workflow_statuses, TEMPLATE_ASSOCIATION_ERROR};
