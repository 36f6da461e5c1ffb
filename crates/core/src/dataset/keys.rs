use std::fmt;

use serde::{Deserialize, Serialize};

/// Entity type identifier for workflow status records.
pub const ENTITY_TYPE_STATUS: &str = "Status";
/// Entity type identifier for status template records.
pub const ENTITY_TYPE_STATUS_TEMPLATE: &str = "StatusTemplate";
/// Entity type identifier for connector records.
pub const ENTITY_TYPE_CONNECTOR: &str = "Connector";
/// Entity type identifier for rule records.
pub const ENTITY_TYPE_RULE: &str = "Rule";
/// Entity type identifier for marking definitions.
pub const ENTITY_TYPE_MARKING_DEFINITION: &str = "Marking-Definition";
/// Entity type identifier for platform settings.
pub const ENTITY_TYPE_SETTINGS: &str = "Settings";

/// The reference datasets held by the cache.
///
/// This is a closed set: only these five datasets are ever cached, and
/// change events for any other entity type are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DatasetKey {
    WorkflowStatus,
    Connector,
    Rule,
    MarkingDefinition,
    Settings,
}

impl DatasetKey {
    /// Every dataset, in the order they are loaded at startup.
    pub const ALL: [DatasetKey; 5] = [
        DatasetKey::WorkflowStatus,
        DatasetKey::Connector,
        DatasetKey::Rule,
        DatasetKey::MarkingDefinition,
        DatasetKey::Settings,
    ];

    /// Returns the entity type identifier whose changes invalidate this dataset.
    pub fn entity_type(&self) -> &'static str {
        match self {
            DatasetKey::WorkflowStatus => ENTITY_TYPE_STATUS,
            DatasetKey::Connector => ENTITY_TYPE_CONNECTOR,
            DatasetKey::Rule => ENTITY_TYPE_RULE,
            DatasetKey::MarkingDefinition => ENTITY_TYPE_MARKING_DEFINITION,
            DatasetKey::Settings => ENTITY_TYPE_SETTINGS,
        }
    }

    /// Returns a stable, human-readable name for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetKey::WorkflowStatus => "WORKFLOW_STATUS",
            DatasetKey::Connector => "CONNECTOR",
            DatasetKey::Rule => "RULE",
            DatasetKey::MarkingDefinition => "MARKING_DEFINITION",
            DatasetKey::Settings => "SETTINGS",
        }
    }
}

impl fmt::Display for DatasetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of resolving an external entity type against the cached datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tracking {
    /// The entity type backs a cached dataset.
    Tracked(DatasetKey),
    /// The entity type is not cached; changes to it are ignored.
    Untracked,
}

/// Maps an entity type identifier to the dataset it invalidates.
///
/// Matching is exact and case-sensitive. Status templates are deliberately
/// untracked: they are joined into workflow statuses at load time only.
///
/// # Examples
///
/// ```
/// use refcache_core::dataset::{dataset_for_entity_type, DatasetKey, Tracking};
///
/// assert_eq!(dataset_for_entity_type("Rule"), Tracking::Tracked(DatasetKey::Rule));
/// assert_eq!(dataset_for_entity_type("Report"), Tracking::Untracked);
/// ```
pub fn dataset_for_entity_type(entity_type: &str) -> Tracking {
    match entity_type {
        ENTITY_TYPE_STATUS => Tracking::Tracked(DatasetKey::WorkflowStatus),
        ENTITY_TYPE_CONNECTOR => Tracking::Tracked(DatasetKey::Connector),
        ENTITY_TYPE_RULE => Tracking::Tracked(DatasetKey::Rule),
        ENTITY_TYPE_MARKING_DEFINITION => Tracking::Tracked(DatasetKey::MarkingDefinition),
        ENTITY_TYPE_SETTINGS => Tracking::Tracked(DatasetKey::Settings),
        _ => Tracking::Untracked,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_dataset_maps_back_to_itself() {
        for key in DatasetKey::ALL {
            assert_eq!(
                dataset_for_entity_type(key.entity_type()),
                Tracking::Tracked(key)
            );
        }
    }

    #[test]
    fn test_untracked_entity_types() {
        assert_eq!(
            dataset_for_entity_type(ENTITY_TYPE_STATUS_TEMPLATE),
            Tracking::Untracked
        );
        assert_eq!(dataset_for_entity_type("Report"), Tracking::Untracked);
        assert_eq!(dataset_for_entity_type(""), Tracking::Untracked);
    }

    #[test]
    fn test_mapping_is_case_sensitive() {
        assert_eq!(dataset_for_entity_type("rule"), Tracking::Untracked);
        assert_eq!(dataset_for_entity_type("SETTINGS"), Tracking::Untracked);
    }

    #[test]
    fn test_startup_order() {
        assert_eq!(DatasetKey::ALL[0], DatasetKey::WorkflowStatus);
        assert_eq!(DatasetKey::ALL[4], DatasetKey::Settings);
    }

    #[test]
    fn test_display() {
        assert_eq!(DatasetKey::MarkingDefinition.to_string(), "MARKING_DEFINITION");
        assert_eq!(DatasetKey::WorkflowStatus.to_string(), "WORKFLOW_STATUS");
    }

    #[test]
    fn test_serde_representation() {
        let json = serde_json::to_string(&DatasetKey::WorkflowStatus).unwrap();
        assert_eq!(json, "\"WORKFLOW_STATUS\"");
    }
}
