//! MCP transports beyond stdio.

mod sse;

pub use sse::{create_sse_router, SseAppState, SseConfig, SseConfigError};
