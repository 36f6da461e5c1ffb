use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use super::{ChangeEvent, Result};

/// Callback invoked for every event delivered to a subscription.
///
/// Handlers run on the bus's delivery path and must return quickly; long
/// work should be spawned.
pub type EventHandler = Arc<dyn Fn(ChangeEvent) + Send + Sync>;

/// Handle identifying an active subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Broadcast bus carrying entity change events.
#[async_trait]
pub trait EventBus: Send + Sync {
    /// Publishes `event` on `topic` to every subscription whose pattern matches.
    async fn publish(&self, topic: &str, event: &ChangeEvent) -> Result<()>;

    /// Registers `handler` for every topic matching the glob `pattern`.
    async fn subscribe(&self, pattern: &str, handler: EventHandler) -> Result<SubscriptionId>;

    /// Removes a subscription. Returns `false` if it was not registered.
    async fn unsubscribe(&self, id: SubscriptionId) -> Result<bool>;
}
