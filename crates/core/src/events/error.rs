use thiserror::Error;

/// Errors that can occur on the change-event bus.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EventError {
    #[error("Publish failed: {0}")]
    PublishFailed(String),
    #[error("Subscription failed: {0}")]
    SubscriptionFailed(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for event bus operations.
pub type Result<T> = std::result::Result<T, EventError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_failed_display() {
        let error = EventError::PublishFailed("channel closed".to_string());
        assert_eq!(error.to_string(), "Publish failed: channel closed");
    }

    #[test]
    fn test_subscription_failed_display() {
        let error = EventError::SubscriptionFailed("no runtime".to_string());
        assert_eq!(error.to_string(), "Subscription failed: no runtime");
    }

    #[test]
    fn test_serialization_display() {
        let error = EventError::Serialization("missing field `instance`".to_string());
        assert_eq!(
            error.to_string(),
            "Serialization error: missing field `instance`"
        );
    }
}
