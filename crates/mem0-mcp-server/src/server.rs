//! MCP server implementation.
//!
//! Owns the transport loops. Stdio is the default: newline-delimited
//! JSON-RPC on stdin/stdout, with all diagnostics on stderr so stdout stays
//! a clean protocol channel. The SSE transport serves the same handlers over
//! HTTP for web clients.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

use mem0_mcp_core::{Config, MemoryStoreClient};

use crate::handlers::Handlers;
use crate::protocol::{error_codes, JsonRpcRequest, JsonRpcResponse};
use crate::transport::{create_sse_router, SseAppState, SseConfig};

/// Transport mode for the MCP server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportMode {
    /// Standard input/output transport (default).
    /// Used for process-based MCP clients (e.g., editors and agents).
    #[default]
    Stdio,

    /// Server-Sent Events transport over HTTP.
    /// Used for web-based clients; responses stream to all connections.
    Sse,
}

impl std::str::FromStr for TransportMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stdio" => Ok(Self::Stdio),
            "sse" => Ok(Self::Sse),
            other => Err(format!(
                "unknown transport '{}' (expected 'stdio' or 'sse')",
                other
            )),
        }
    }
}

/// MCP server state.
///
/// Handlers are Arc-wrapped so the SSE transport can share them across
/// concurrent connections.
pub struct McpServer {
    config: Config,
    handlers: Arc<Handlers>,
}

impl McpServer {
    /// Create a server over an already-constructed mem0 client.
    pub fn new(config: Config, client: Arc<dyn MemoryStoreClient>) -> Self {
        let handlers = Arc::new(Handlers::from_config(client, &config));
        Self { config, handlers }
    }

    /// Run the server on the configured transport.
    pub async fn run(&self, mode: TransportMode) -> Result<()> {
        match mode {
            TransportMode::Stdio => self.run_stdio().await,
            TransportMode::Sse => self.run_sse().await,
        }
    }

    /// Run the stdio transport, reading from stdin and writing to stdout.
    ///
    /// Uses tokio async I/O so in-flight backoff timers keep progressing
    /// while the loop waits for input.
    async fn run_stdio(&self) -> Result<()> {
        let stdin = tokio::io::stdin();
        let stdout = tokio::io::stdout();
        let mut reader = BufReader::new(stdin);
        let mut writer = tokio::io::BufWriter::new(stdout);
        let mut line = String::new();

        info!("Server ready, waiting for requests on stdio...");

        loop {
            line.clear();

            let bytes_read = reader.read_line(&mut line).await.map_err(|e| {
                error!("Failed to read from stdin: {}", e);
                anyhow::anyhow!("stdin read error: {}", e)
            })?;

            // EOF - client closed the stream
            if bytes_read == 0 {
                info!("stdin closed (EOF), shutting down...");
                break;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            debug!("Received: {}", trimmed);

            let response = self.handle_request(trimmed).await;

            if response.is_notification_ack() {
                debug!("Notification handled, no response needed");
                continue;
            }

            let response_json = serde_json::to_string(&response)?;
            debug!("Sending: {}", response_json);

            // MCP requires newline-delimited JSON on stdout
            writer.write_all(response_json.as_bytes()).await.map_err(|e| {
                error!("Failed to write to stdout: {}", e);
                anyhow::anyhow!("stdout write error: {}", e)
            })?;
            writer.write_all(b"\n").await?;
            writer.flush().await.map_err(|e| {
                error!("Failed to flush stdout: {}", e);
                anyhow::anyhow!("stdout flush error: {}", e)
            })?;
        }

        Ok(())
    }

    /// Run the SSE transport on the configured bind address and port.
    async fn run_sse(&self) -> Result<()> {
        let bind_addr: SocketAddr = format!(
            "{}:{}",
            self.config.mcp.bind_address, self.config.mcp.sse_port
        )
        .parse()
        .map_err(|e| {
            anyhow::anyhow!(
                "Invalid SSE bind address '{}:{}': {}",
                self.config.mcp.bind_address,
                self.config.mcp.sse_port,
                e
            )
        })?;

        let state = SseAppState::new(Arc::clone(&self.handlers), SseConfig::default())
            .map_err(|e| anyhow::anyhow!("Invalid SSE configuration: {}", e))?;
        let router = create_sse_router(state);

        let listener = tokio::net::TcpListener::bind(bind_addr).await.map_err(|e| {
            error!("Failed to bind SSE listener to {}: {}", bind_addr, e);
            anyhow::anyhow!(
                "Failed to bind SSE listener to {}: {}. \
                 Address may be in use or require elevated permissions.",
                bind_addr,
                e
            )
        })?;

        info!("MCP Server listening on http://{} (SSE transport)", bind_addr);

        axum::serve(listener, router)
            .await
            .map_err(|e| anyhow::anyhow!("SSE server error: {}", e))
    }

    /// Handle a single JSON-RPC request line.
    async fn handle_request(&self, input: &str) -> JsonRpcResponse {
        let request: JsonRpcRequest = match serde_json::from_str(input) {
            Ok(r) => r,
            Err(e) => {
                warn!("Failed to parse request: {}", e);
                return JsonRpcResponse::error(
                    None,
                    error_codes::PARSE_ERROR,
                    format!("Parse error: {}", e),
                );
            }
        };

        if request.jsonrpc != "2.0" {
            return JsonRpcResponse::error(
                request.id,
                error_codes::INVALID_REQUEST,
                "Invalid JSON-RPC version",
            );
        }

        self.handlers.dispatch(request).await
    }
}
