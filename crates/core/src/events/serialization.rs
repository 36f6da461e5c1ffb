//! JSON encoding of change events and cached snapshots.

use crate::dataset::DatasetItem;

use super::{ChangeEvent, EventError, Result};

/// Serializes a change event to its JSON wire form.
pub fn serialize_event(event: &ChangeEvent) -> Result<Vec<u8>> {
    serde_json::to_vec(event).map_err(|e| EventError::Serialization(e.to_string()))
}

/// Deserializes a change event from JSON.
///
/// Only `instance.entity_type` is required; `type` defaults to an update and
/// unknown fields are ignored.
pub fn deserialize_event(bytes: &[u8]) -> Result<ChangeEvent> {
    serde_json::from_slice(bytes).map_err(|e| EventError::Serialization(e.to_string()))
}

/// Serializes a cached dataset snapshot to pretty-printed JSON.
pub fn serialize_items(items: &[DatasetItem]) -> Result<String> {
    serde_json::to_string_pretty(items).map_err(|e| EventError::Serialization(e.to_string()))
}
