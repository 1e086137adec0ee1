//! In-memory response caching for API reads.
//!
//! This module provides a transport-agnostic cache that:
//! - Stores time-stamped values with a per-entry TTL
//! - Evicts expired entries lazily, when they are read
//! - Builds order-independent keys from an endpoint and its query parameters
//! - Wraps any async producer with stale-while-revalidate fetching

mod entry;
mod key;
mod layer;
mod store;

pub use key::build_key;
pub use layer::{CacheResult, CacheSource};
pub use store::ResponseCache;
