//! mem0 service client and client cache.
//!
//! # Module Organization
//!
//! - `mem0`: the reqwest-based HTTP client for the mem0 API and the
//!   [`MemoryStoreClient`] trait the handlers are written against
//! - `cache`: credential-keyed cache guaranteeing one client per key

mod cache;
mod mem0;

pub use cache::ClientCache;
pub use mem0::{
    flatten_results, validate_api_key, Mem0Client, Mem0Config, MemoryStoreClient,
    API_KEY_MIN_LEN, API_KEY_PREFIX,
};
