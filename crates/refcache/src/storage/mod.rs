//! Data-access implementations.
//!
//! The authoritative store lives outside this crate; only an in-memory
//! implementation of `EntityRepository` is provided, for tests and the demo
//! binary.

pub mod inmemory;
