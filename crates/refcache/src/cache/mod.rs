//! Reference cache: store, loaders, invalidation and lifecycle.
//!
//! The pure contracts (`Loader`, `CacheError`, `ManagerState`) live in
//! `refcache_core::cache`; this module wires them to tokio.

mod listener;
pub mod loaders;
mod manager;
mod store;

pub use listener::InvalidationListener;
pub use loaders::{default_loaders, ConnectorLoader, EntityListLoader, WorkflowStatusLoader};
pub use manager::CacheManager;
pub use store::{CacheEntry, CacheStore, Snapshot};
