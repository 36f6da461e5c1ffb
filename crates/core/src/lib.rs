//! Core types and traits for the refcache reference-data cache.
//!
//! Everything in this crate is pure: dataset keys and records, the workflow
//! status join, topic naming and matching, event payloads, error types, and
//! the trait seams (`Loader`, `EventBus`, `EntityRepository`) that the
//! runtime crate implements.

pub mod cache;
pub mod dataset;
pub mod events;
pub mod storage;
