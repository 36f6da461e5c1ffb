use thiserror::Error;

use crate::dataset::DatasetKey;
use crate::events::EventError;
use crate::storage::RepositoryError;

use super::ManagerState;

/// Errors that can occur while loading or managing cached datasets.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("Failed to load {dataset}: {reason}")]
    LoadFailed { dataset: DatasetKey, reason: String },
    #[error("Cannot {operation} cache manager while {state}")]
    InvalidState {
        operation: &'static str,
        state: ManagerState,
    },
    #[error("Event bus error: {0}")]
    EventBus(#[from] EventError),
}

impl CacheError {
    /// Wraps a repository failure with the dataset that was being loaded.
    pub fn load_failed(dataset: DatasetKey, source: RepositoryError) -> Self {
        Self::LoadFailed {
            dataset,
            reason: source.to_string(),
        }
    }
}

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_failed_display() {
        let error = CacheError::load_failed(
            DatasetKey::Rule,
            RepositoryError::ConnectionFailed("timeout".to_string()),
        );
        assert_eq!(
            error.to_string(),
            "Failed to load RULE: Connection failed: timeout"
        );
    }

    #[test]
    fn test_invalid_state_display() {
        let error = CacheError::InvalidState {
            operation: "start",
            state: ManagerState::Running,
        };
        assert_eq!(error.to_string(), "Cannot start cache manager while running");
    }

    #[test]
    fn test_event_bus_from() {
        let error: CacheError = EventError::SubscriptionFailed("closed".to_string()).into();
        assert_eq!(
            error.to_string(),
            "Event bus error: Subscription failed: closed"
        );
    }
}
