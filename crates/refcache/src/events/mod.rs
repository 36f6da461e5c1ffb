//! Event bus implementations.
//!
//! Concrete implementations of `refcache_core::events::EventBus`. Only the
//! in-memory bus ships here; other transports implement the same trait.

mod memory;

pub use memory::{MemoryEventBus, DEFAULT_CAPACITY};
