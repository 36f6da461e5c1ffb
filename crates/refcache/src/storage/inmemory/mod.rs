//! In-memory entity repository for testing.
//!
//! Stores reference entities in a `Vec` wrapped in `Arc<RwLock<_>>`, keeping
//! insertion order. Useful for tests and development where a real data layer
//! is not available.
//!
//! # Example
//!
//! ```rust,ignore
//! use refcache::storage::inmemory::InMemoryRepository;
//!
//! let repo = InMemoryRepository::new();
//! repo.upsert(Entity::Rule(Rule::new("Attribution", true))).await;
//! ```

mod repository;

pub use repository::InMemoryRepository;
