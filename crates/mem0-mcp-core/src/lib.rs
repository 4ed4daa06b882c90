//! Core library for the mem0 MCP server.
//!
//! This crate contains everything below the MCP protocol layer:
//!
//! - [`client`]: the mem0 HTTP client, the [`client::MemoryStoreClient`]
//!   trait the handlers are written against, and the credential-keyed
//!   [`client::ClientCache`].
//! - [`retry`]: the resilient invoker that wraps every mem0 call with
//!   classification-based retry and exponential backoff.
//! - [`filters`]: default-filter normalization that scopes every call to a
//!   user identity.
//! - [`config`]: typed configuration with environment overrides.
//! - [`error`]: error types shared across the workspace.

pub mod client;
pub mod config;
pub mod error;
pub mod filters;
pub mod retry;

pub use client::{flatten_results, ClientCache, Mem0Client, Mem0Config, MemoryStoreClient};
pub use config::{default_enable_graph, Config};
pub use error::{CoreError, CoreResult, ErrorClass, ServiceError};
pub use filters::{project_filter, with_default_filters};
pub use retry::{invoke, RetryPolicy};
