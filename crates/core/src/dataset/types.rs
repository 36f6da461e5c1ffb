use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::keys::{
    DatasetKey, ENTITY_TYPE_MARKING_DEFINITION, ENTITY_TYPE_RULE, ENTITY_TYPE_SETTINGS,
    ENTITY_TYPE_STATUS, ENTITY_TYPE_STATUS_TEMPLATE,
};

/// A named, colored template that workflow statuses point at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusTemplate {
    pub id: Uuid,
    pub name: String,
    /// Display color (CSS color value).
    pub color: String,
}

impl StatusTemplate {
    /// Creates a new template with a random ID.
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            color: color.into(),
        }
    }

    /// Sets a specific ID for this template (useful for testing).
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }
}

/// A workflow status record. Its display name lives on the referenced template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub id: Uuid,
    pub template_id: Uuid,
    /// The entity type this workflow step applies to (e.g. `"Report"`).
    pub target_type: String,
    /// Position of the step within its workflow.
    pub order: i32,
}

impl Status {
    /// Creates a new status pointing at `template_id`.
    pub fn new(template_id: Uuid, target_type: impl Into<String>, order: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            template_id,
            target_type: target_type.into(),
            order,
        }
    }

    /// Sets a specific ID for this status (useful for testing).
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }
}

/// A status joined with the name of its template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowStatusView {
    #[serde(flatten)]
    pub status: Status,
    pub name: String,
}

/// A registered connector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connector {
    pub id: Uuid,
    pub name: String,
    pub connector_type: String,
    pub scope: Vec<String>,
    pub active: bool,
    pub auto: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Connector {
    /// Creates a new active, non-automatic connector with an empty scope.
    pub fn new(name: impl Into<String>, connector_type: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            connector_type: connector_type.into(),
            scope: Vec::new(),
            active: true,
            auto: false,
            updated_at: None,
        }
    }

    /// Sets the scope of entity types this connector handles.
    pub fn with_scope<I, S>(mut self, scope: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scope = scope.into_iter().map(Into::into).collect();
        self
    }

    /// Marks the connector as automatically triggered.
    pub fn with_auto(mut self, auto: bool) -> Self {
        self.auto = auto;
        self
    }

    /// Sets the active flag.
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Sets a specific ID for this connector (useful for testing).
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }
}

/// An inference rule and whether it is enabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub id: Uuid,
    pub name: String,
    pub active: bool,
}

impl Rule {
    pub fn new(name: impl Into<String>, active: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            active,
        }
    }

    /// Sets a specific ID for this rule (useful for testing).
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }
}

/// A data marking such as `TLP:GREEN`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkingDefinition {
    pub id: Uuid,
    pub definition_type: String,
    pub definition: String,
    pub order: i32,
    pub color: String,
}

impl MarkingDefinition {
    pub fn new(
        definition_type: impl Into<String>,
        definition: impl Into<String>,
        order: i32,
        color: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            definition_type: definition_type.into(),
            definition: definition.into(),
            order,
            color: color.into(),
        }
    }

    /// Sets a specific ID for this marking (useful for testing).
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }
}

/// Platform-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub id: Uuid,
    pub platform_title: String,
    pub platform_email: String,
    pub platform_language: String,
    pub platform_theme: String,
}

impl Settings {
    /// Creates settings with the given title and default language/theme.
    pub fn new(platform_title: impl Into<String>, platform_email: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            platform_title: platform_title.into(),
            platform_email: platform_email.into(),
            platform_language: "auto".to_string(),
            platform_theme: "dark".to_string(),
        }
    }

    /// Sets a specific ID for these settings (useful for testing).
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }
}

/// A record returned by the generic entity listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "entity_type", content = "data")]
pub enum Entity {
    StatusTemplate(StatusTemplate),
    Status(Status),
    Rule(Rule),
    #[serde(rename = "Marking-Definition")]
    MarkingDefinition(MarkingDefinition),
    Settings(Settings),
}

impl Entity {
    /// Returns the entity type identifier of this record.
    pub fn entity_type(&self) -> &'static str {
        match self {
            Entity::StatusTemplate(_) => ENTITY_TYPE_STATUS_TEMPLATE,
            Entity::Status(_) => ENTITY_TYPE_STATUS,
            Entity::Rule(_) => ENTITY_TYPE_RULE,
            Entity::MarkingDefinition(_) => ENTITY_TYPE_MARKING_DEFINITION,
            Entity::Settings(_) => ENTITY_TYPE_SETTINGS,
        }
    }

    /// Returns the record's ID.
    pub fn id(&self) -> Uuid {
        match self {
            Entity::StatusTemplate(t) => t.id,
            Entity::Status(s) => s.id,
            Entity::Rule(r) => r.id,
            Entity::MarkingDefinition(m) => m.id,
            Entity::Settings(s) => s.id,
        }
    }

    /// Returns the `order` field for records that carry one.
    pub fn order(&self) -> Option<i32> {
        match self {
            Entity::Status(s) => Some(s.order),
            Entity::MarkingDefinition(m) => Some(m.order),
            _ => None,
        }
    }

    /// Returns the display name for records that carry one.
    pub fn name(&self) -> Option<&str> {
        match self {
            Entity::StatusTemplate(t) => Some(&t.name),
            Entity::Rule(r) => Some(&r.name),
            Entity::MarkingDefinition(m) => Some(&m.definition),
            Entity::Settings(s) => Some(&s.platform_title),
            Entity::Status(_) => None,
        }
    }
}

/// A single cached value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "dataset", content = "item", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DatasetItem {
    WorkflowStatus(WorkflowStatusView),
    Connector(Connector),
    Rule(Rule),
    MarkingDefinition(MarkingDefinition),
    Settings(Settings),
}

impl DatasetItem {
    /// Returns the dataset this item belongs to.
    pub fn dataset(&self) -> DatasetKey {
        match self {
            DatasetItem::WorkflowStatus(_) => DatasetKey::WorkflowStatus,
            DatasetItem::Connector(_) => DatasetKey::Connector,
            DatasetItem::Rule(_) => DatasetKey::Rule,
            DatasetItem::MarkingDefinition(_) => DatasetKey::MarkingDefinition,
            DatasetItem::Settings(_) => DatasetKey::Settings,
        }
    }

    /// Converts a listed entity into the passthrough item for its dataset.
    ///
    /// Returns `None` for entity kinds that are never cached as-is (statuses
    /// and templates only appear through the workflow join).
    pub fn from_entity(entity: Entity) -> Option<Self> {
        match entity {
            Entity::Rule(r) => Some(DatasetItem::Rule(r)),
            Entity::MarkingDefinition(m) => Some(DatasetItem::MarkingDefinition(m)),
            Entity::Settings(s) => Some(DatasetItem::Settings(s)),
            Entity::Status(_) | Entity::StatusTemplate(_) => None,
        }
    }
}
