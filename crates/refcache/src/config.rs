use std::env;

use refcache_core::events::all_changes_pattern;

/// Default prefix prepended to every change topic.
pub const DEFAULT_TOPIC_PREFIX: &str = "platform_";

/// Cache configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Prefix of change topics (default: "platform_")
    pub topic_prefix: String,
    /// Capacity of the in-memory event channel (default: 1,000)
    pub event_capacity: usize,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `REFCACHE_TOPIC_PREFIX` - Change topic prefix (default: "platform_")
    /// - `REFCACHE_EVENT_CAPACITY` - Event channel capacity (default: 1,000)
    pub fn from_env() -> Self {
        Self {
            topic_prefix: env::var("REFCACHE_TOPIC_PREFIX")
                .unwrap_or_else(|_| DEFAULT_TOPIC_PREFIX.to_string()),
            event_capacity: env::var("REFCACHE_EVENT_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(crate::events::DEFAULT_CAPACITY),
        }
    }

    /// Pattern the invalidation listener subscribes with.
    pub fn change_pattern(&self) -> String {
        all_changes_pattern(&self.topic_prefix)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
