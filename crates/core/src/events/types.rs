use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::topics::change_topic;

/// What happened to the entity instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeAction {
    Create,
    #[default]
    Update,
    Delete,
}

impl ChangeAction {
    /// Returns the topic suffix used when publishing this kind of change.
    pub fn topic_suffix(&self) -> &'static str {
        match self {
            ChangeAction::Create => "ADDED_TOPIC",
            ChangeAction::Update => "EDIT_TOPIC",
            ChangeAction::Delete => "DELETE_TOPIC",
        }
    }
}

/// The entity instance a change event refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventInstance {
    pub entity_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
}

/// A broadcast notification that some entity instance changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    #[serde(rename = "type", default)]
    pub action: ChangeAction,
    pub instance: EventInstance,
}

impl ChangeEvent {
    /// Creates a change event for an instance of `entity_type`.
    pub fn new(action: ChangeAction, entity_type: impl Into<String>, id: Option<Uuid>) -> Self {
        Self {
            action,
            instance: EventInstance {
                entity_type: entity_type.into(),
                id,
            },
        }
    }

    /// Creates an event for a newly created instance.
    pub fn created(entity_type: impl Into<String>, id: Uuid) -> Self {
        Self::new(ChangeAction::Create, entity_type, Some(id))
    }

    /// Creates an event for an updated instance.
    pub fn updated(entity_type: impl Into<String>, id: Uuid) -> Self {
        Self::new(ChangeAction::Update, entity_type, Some(id))
    }

    /// Creates an event for a deleted instance.
    pub fn deleted(entity_type: impl Into<String>, id: Uuid) -> Self {
        Self::new(ChangeAction::Delete, entity_type, Some(id))
    }

    /// Returns the entity type of the changed instance.
    pub fn entity_type(&self) -> &str {
        &self.instance.entity_type
    }

    /// Returns the topic this event is published on under `prefix`.
    pub fn topic(&self, prefix: &str) -> String {
        change_topic(prefix, self.entity_type(), self.action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_set_action() {
        let id = Uuid::nil();
        assert_eq!(ChangeEvent::created("Rule", id).action, ChangeAction::Create);
        assert_eq!(ChangeEvent::updated("Rule", id).action, ChangeAction::Update);
        assert_eq!(ChangeEvent::deleted("Rule", id).action, ChangeAction::Delete);
    }

    #[test]
    fn test_entity_type_accessor() {
        let event = ChangeEvent::updated("Marking-Definition", Uuid::nil());
        assert_eq!(event.entity_type(), "Marking-Definition");
    }

    #[test]
    fn test_topic_per_action() {
        let id = Uuid::nil();
        assert_eq!(
            ChangeEvent::created("Rule", id).topic("platform_"),
            "platform_Rule_ADDED_TOPIC"
        );
        assert_eq!(
            ChangeEvent::updated("Settings", id).topic("platform_"),
            "platform_Settings_EDIT_TOPIC"
        );
        assert_eq!(
            ChangeEvent::deleted("Status", id).topic("platform_"),
            "platform_Status_DELETE_TOPIC"
        );
    }
}
