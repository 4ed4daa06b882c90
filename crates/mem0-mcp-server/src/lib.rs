//! MCP server exposing mem0-backed coding-preference tools.
//!
//! Speaks JSON-RPC 2.0 over stdio (default) or SSE, serving three tools:
//! `add_coding_preference`, `get_all_coding_preferences`, and
//! `search_coding_preferences`, all scoped to a project via metadata
//! filters.

pub mod handlers;
pub mod protocol;
pub mod server;
pub mod tools;
pub mod transport;

pub use handlers::Handlers;
pub use server::{McpServer, TransportMode};
