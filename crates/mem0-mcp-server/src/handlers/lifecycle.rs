//! MCP lifecycle handlers: initialize, initialized notification, shutdown.

use serde_json::json;
use tracing::{debug, info};

use crate::protocol::{JsonRpcId, JsonRpcResponse};

impl super::Handlers {
    /// Handle the initialize request.
    ///
    /// Advertises the tools capability and server identity. The protocol
    /// version is pinned to the MCP revision this server implements.
    pub(super) fn handle_initialize(&self, id: Option<JsonRpcId>) -> JsonRpcResponse {
        info!("Handling initialize request");

        JsonRpcResponse::success(
            id,
            json!({
                "protocolVersion": "2024-11-05",
                "capabilities": {
                    "tools": {}
                },
                "serverInfo": {
                    "name": "mem0-mcp-server",
                    "version": env!("CARGO_PKG_VERSION")
                }
            }),
        )
    }

    /// Handle the initialized notification.
    ///
    /// Notifications expect no response; the transport loop suppresses the
    /// returned acknowledgement.
    pub(super) fn handle_initialized_notification(&self) -> JsonRpcResponse {
        debug!("Client initialization complete");
        JsonRpcResponse::notification_ack()
    }

    /// Handle the shutdown request.
    pub(super) fn handle_shutdown(&self, id: Option<JsonRpcId>) -> JsonRpcResponse {
        info!("Handling shutdown request");
        JsonRpcResponse::success(id, json!(null))
    }
}
