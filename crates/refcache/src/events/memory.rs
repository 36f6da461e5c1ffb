//! In-memory event bus implementation.
//!
//! Provides a thread-safe publish/subscribe bus for change events using a
//! single tokio broadcast channel. Events travel as JSON payloads, the same
//! wire form an external transport carries. Every subscription owns a
//! delivery task that filters the broadcast stream by its topic pattern.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;

use refcache_core::events::{
    deserialize_event, serialize_event, topic_matches, ChangeEvent, EventBus, EventHandler,
    Result, SubscriptionId,
};

/// Default channel capacity for published events.
pub const DEFAULT_CAPACITY: usize = 1_000;

/// A topic and the JSON-encoded event published on it.
type Message = (String, Arc<[u8]>);

/// In-memory event bus.
///
/// Cloning yields another handle to the same channel and subscriptions.
#[derive(Debug, Clone)]
pub struct MemoryEventBus {
    sender: broadcast::Sender<Message>,
    subscriptions: Arc<RwLock<HashMap<SubscriptionId, JoinHandle<()>>>>,
    next_id: Arc<AtomicU64>,
}

impl MemoryEventBus {
    /// Creates a bus with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a bus whose channel buffers up to `capacity` events per
    /// subscriber before the slowest one starts lagging.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            subscriptions: Arc::new(RwLock::new(HashMap::new())),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Publishes an already encoded JSON payload on `topic`.
    ///
    /// Payloads that do not decode as a change event are dropped by the
    /// subscribers with a warning.
    pub async fn publish_raw(&self, topic: &str, payload: Vec<u8>) -> Result<()> {
        // No receivers just means nobody is listening.
        let _ = self.sender.send((topic.to_string(), Arc::from(payload)));
        tracing::trace!(topic, "Event published");
        Ok(())
    }

    /// Number of active subscriptions.
    pub async fn subscription_count(&self) -> usize {
        self.subscriptions.read().await.len()
    }
}

impl Default for MemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

async fn deliver(
    id: SubscriptionId,
    pattern: String,
    mut receiver: broadcast::Receiver<Message>,
    handler: EventHandler,
) {
    loop {
        match receiver.recv().await {
            Ok((topic, payload)) => {
                if !topic_matches(&pattern, &topic) {
                    continue;
                }
                match deserialize_event(&payload) {
                    Ok(event) => handler(event),
                    Err(err) => tracing::warn!(
                        subscription = %id,
                        topic = %topic,
                        error = %err,
                        "Dropping undecodable event"
                    ),
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(
                    subscription = %id,
                    skipped,
                    "Subscriber lagged behind, events dropped"
                );
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

#[async_trait]
impl EventBus for MemoryEventBus {
    async fn publish(&self, topic: &str, event: &ChangeEvent) -> Result<()> {
        let payload = serialize_event(event)?;
        self.publish_raw(topic, payload).await
    }

    async fn subscribe(&self, pattern: &str, handler: EventHandler) -> Result<SubscriptionId> {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));

        // The receiver exists before this returns, so nothing published
        // afterwards is missed.
        let receiver = self.sender.subscribe();
        let task = tokio::spawn(deliver(id, pattern.to_string(), receiver, handler));

        self.subscriptions.write().await.insert(id, task);
        tracing::debug!(subscription = %id, pattern, "Subscribed");
        Ok(id)
    }

    async fn unsubscribe(&self, id: SubscriptionId) -> Result<bool> {
        match self.subscriptions.write().await.remove(&id) {
            Some(task) => {
                task.abort();
                tracing::debug!(subscription = %id, "Unsubscribed");
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
