//! Process-local cache of reference datasets.
//!
//! Five small, frequently read datasets (workflow statuses, connectors,
//! rules, marking definitions and platform settings) are loaded once at
//! startup and reloaded whenever a change event for one of their entity
//! types arrives on the event bus.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use refcache::cache::CacheManager;
//! use refcache::config::Config;
//! use refcache::events::MemoryEventBus;
//! use refcache::storage::inmemory::InMemoryRepository;
//! use refcache_core::dataset::DatasetKey;
//!
//! # async fn run() -> refcache_core::cache::Result<()> {
//! let config = Config::from_env();
//! let manager = CacheManager::new(
//!     Arc::new(InMemoryRepository::new()),
//!     Arc::new(MemoryEventBus::with_capacity(config.event_capacity)),
//!     &config,
//! );
//! manager.start().await?;
//! let rules = manager.read(DatasetKey::Rule).await;
//! manager.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod events;
pub mod mock_data;
pub mod storage;
