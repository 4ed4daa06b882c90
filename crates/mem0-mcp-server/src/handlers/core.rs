//! Core Handlers struct and dispatch logic.

use std::sync::Arc;

use tracing::debug;

use mem0_mcp_core::{Config, MemoryStoreClient, RetryPolicy};

use crate::protocol::{error_codes, methods, JsonRpcRequest, JsonRpcResponse};

/// Request handlers for the MCP protocol.
///
/// Holds the mem0 client behind the [`MemoryStoreClient`] trait so the tool
/// implementations can be exercised against an in-memory double in tests.
pub struct Handlers {
    /// Client for the mem0 memory store.
    pub(super) client: Arc<dyn MemoryStoreClient>,

    /// Retry policy applied to every mem0 call.
    pub(super) retry: RetryPolicy,

    /// User identity injected into every filter expression.
    pub(super) default_user_id: String,

    /// Default graph processing flag, overridable per tool call.
    pub(super) enable_graph: bool,

    /// Page size for get_all requests.
    pub(super) page_size: usize,
}

impl Handlers {
    /// Create handlers with explicit settings.
    pub fn new(
        client: Arc<dyn MemoryStoreClient>,
        retry: RetryPolicy,
        default_user_id: impl Into<String>,
        enable_graph: bool,
        page_size: usize,
    ) -> Self {
        Self {
            client,
            retry,
            default_user_id: default_user_id.into(),
            enable_graph,
            page_size,
        }
    }

    /// Create handlers from the server configuration.
    pub fn from_config(client: Arc<dyn MemoryStoreClient>, config: &Config) -> Self {
        Self::new(
            client,
            RetryPolicy::default(),
            config.mem0.default_user_id.clone(),
            config.mem0.enable_graph,
            config.mem0.page_size,
        )
    }

    /// Dispatch a JSON-RPC request to the appropriate handler.
    pub async fn dispatch(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        debug!("Dispatching method: {}", request.method);

        match request.method.as_str() {
            // MCP lifecycle methods
            methods::INITIALIZE => self.handle_initialize(request.id),
            methods::INITIALIZED_NOTIFICATION => self.handle_initialized_notification(),
            methods::SHUTDOWN => self.handle_shutdown(request.id),

            // MCP tools protocol
            methods::TOOLS_LIST => self.handle_tools_list(request.id),
            methods::TOOLS_CALL => self.handle_tools_call(request.id, request.params).await,

            _ => JsonRpcResponse::error(
                request.id,
                error_codes::METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            ),
        }
    }
}
