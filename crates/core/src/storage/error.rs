use thiserror::Error;

/// Errors surfaced by the authoritative data-access layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Query failed: {0}")]
    QueryFailed(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let error = RepositoryError::NotFound {
            entity_type: "Rule",
            id: "abc-123".to_string(),
        };
        assert_eq!(error.to_string(), "Rule not found: abc-123");
    }

    #[test]
    fn test_connection_failed_display() {
        let error = RepositoryError::ConnectionFailed("timeout after 30s".to_string());
        assert_eq!(error.to_string(), "Connection failed: timeout after 30s");
    }

    #[test]
    fn test_query_failed_display() {
        let error = RepositoryError::QueryFailed("index missing".to_string());
        assert_eq!(error.to_string(), "Query failed: index missing");
    }

    #[test]
    fn test_invalid_data_display() {
        let error = RepositoryError::InvalidData("order out of range".to_string());
        assert_eq!(error.to_string(), "Invalid data: order out of range");
    }
}
