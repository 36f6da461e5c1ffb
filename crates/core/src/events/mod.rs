mod error;
mod serialization;
mod topics;
mod traits;
mod types;

pub use error::{EventError, Result};
pub use serialization::{deserialize_event, serialize_event, serialize_items};
pub use topics::{all_changes_pattern, change_topic, topic_matches};
pub use traits::{EventBus, EventHandler, SubscriptionId};
pub use types::{ChangeAction, ChangeEvent, EventInstance};
