//! SSE (Server-Sent Events) transport for MCP.
//!
//! Exposes two HTTP endpoints:
//!
//! - `GET /sse`: streams JSON-RPC responses to all connected clients as
//!   newline-free SSE `message` events
//! - `POST /messages`: accepts a JSON-RPC request, dispatches it, and
//!   broadcasts the response over the event stream
//!
//! Requests are acknowledged with `202 Accepted`; the actual JSON-RPC
//! response arrives on the stream, matched by request id.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::{Stream, StreamExt};
use tokio::sync::broadcast;
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use tracing::{debug, info, warn};

use crate::handlers::Handlers;
use crate::protocol::{error_codes, JsonRpcRequest, JsonRpcResponse};

/// SSE transport configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseConfig {
    /// Keep-alive comment interval, preventing proxy timeouts.
    pub keepalive_interval: Duration,

    /// Broadcast buffer size; slow clients that fall behind skip events.
    pub buffer_size: usize,
}

impl Default for SseConfig {
    fn default() -> Self {
        Self {
            keepalive_interval: Duration::from_secs(15),
            buffer_size: 100,
        }
    }
}

impl SseConfig {
    /// Validate configuration.
    pub fn validate(&self) -> Result<(), SseConfigError> {
        if self.keepalive_interval.is_zero() {
            return Err(SseConfigError::InvalidKeepalive);
        }
        if self.buffer_size == 0 {
            return Err(SseConfigError::InvalidBufferSize);
        }
        Ok(())
    }
}

/// SSE configuration validation error.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum SseConfigError {
    #[error("keepalive_interval cannot be zero")]
    InvalidKeepalive,

    #[error("buffer_size cannot be zero")]
    InvalidBufferSize,
}

/// Shared state for the SSE transport.
///
/// Responses are broadcast pre-serialized so every connected client receives
/// the same bytes.
#[derive(Clone)]
pub struct SseAppState {
    handlers: Arc<Handlers>,
    event_tx: broadcast::Sender<String>,
    config: SseConfig,
}

impl SseAppState {
    /// Create SSE state over the given handlers.
    pub fn new(handlers: Arc<Handlers>, config: SseConfig) -> Result<Self, SseConfigError> {
        config.validate()?;
        let (event_tx, _) = broadcast::channel(config.buffer_size);
        Ok(Self {
            handlers,
            event_tx,
            config,
        })
    }

    /// Broadcast a serialized response to all connected clients.
    ///
    /// Returns the number of receivers; 0 when no client is connected.
    pub fn broadcast(&self, payload: String) -> usize {
        self.event_tx.send(payload).unwrap_or(0)
    }

    /// Subscribe to the response stream.
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.event_tx.subscribe()
    }
}

/// Create the axum router for the SSE transport.
pub fn create_sse_router(state: SseAppState) -> Router {
    Router::new()
        .route("/sse", get(sse_handler))
        .route("/messages", post(messages_handler))
        .with_state(state)
}

/// Stream broadcast responses to one client.
async fn sse_handler(
    State(state): State<SseAppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!("SSE client connected");

    let rx = state.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|msg| async move {
        match msg {
            Ok(json) => Some(Ok(Event::default().event("message").data(json))),
            Err(BroadcastStreamRecvError::Lagged(missed)) => {
                warn!(missed, "SSE client lagged, skipped events");
                None
            }
        }
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(state.config.keepalive_interval)
            .text("keep-alive"),
    )
}

/// Accept a JSON-RPC request and broadcast the response.
async fn messages_handler(State(state): State<SseAppState>, body: String) -> StatusCode {
    let response = match serde_json::from_str::<JsonRpcRequest>(&body) {
        Ok(request) if request.jsonrpc != "2.0" => JsonRpcResponse::error(
            request.id,
            error_codes::INVALID_REQUEST,
            "Invalid JSON-RPC version",
        ),
        Ok(request) => state.handlers.dispatch(request).await,
        Err(e) => {
            warn!("Failed to parse SSE request: {}", e);
            JsonRpcResponse::error(
                None,
                error_codes::PARSE_ERROR,
                format!("Parse error: {}", e),
            )
        }
    };

    if response.is_notification_ack() {
        debug!("Notification handled, nothing broadcast");
        return StatusCode::ACCEPTED;
    }

    match serde_json::to_string(&response) {
        Ok(json) => {
            let receivers = state.broadcast(json);
            debug!(receivers, "Broadcast JSON-RPC response");
            StatusCode::ACCEPTED
        }
        Err(e) => {
            warn!("Failed to serialize response: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use mem0_mcp_core::RetryPolicy;

    use super::*;

    struct NoopStore;

    #[async_trait::async_trait]
    impl mem0_mcp_core::MemoryStoreClient for NoopStore {
        async fn add(
            &self,
            _: serde_json::Value,
            _: &str,
            _: serde_json::Value,
            _: bool,
        ) -> Result<serde_json::Value, mem0_mcp_core::ServiceError> {
            Ok(json!({ "results": [] }))
        }

        async fn get_all(
            &self,
            _: serde_json::Value,
            _: usize,
            _: usize,
        ) -> Result<serde_json::Value, mem0_mcp_core::ServiceError> {
            Ok(json!([]))
        }

        async fn search(
            &self,
            _: &str,
            _: serde_json::Value,
            _: bool,
        ) -> Result<serde_json::Value, mem0_mcp_core::ServiceError> {
            Ok(json!({ "results": [] }))
        }

        async fn update_project(
            &self,
            _: &str,
        ) -> Result<serde_json::Value, mem0_mcp_core::ServiceError> {
            Ok(json!({}))
        }
    }

    fn state() -> SseAppState {
        let handlers = Arc::new(Handlers::new(
            Arc::new(NoopStore),
            RetryPolicy::default(),
            "cursor_mcp",
            false,
            50,
        ));
        SseAppState::new(handlers, SseConfig::default()).unwrap()
    }

    #[test]
    fn test_sse_config_defaults() {
        let config = SseConfig::default();
        assert_eq!(config.keepalive_interval, Duration::from_secs(15));
        assert_eq!(config.buffer_size, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sse_config_rejects_zero_values() {
        let config = SseConfig {
            keepalive_interval: Duration::ZERO,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(SseConfigError::InvalidKeepalive));

        let config = SseConfig {
            buffer_size: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(SseConfigError::InvalidBufferSize));
    }

    #[test]
    fn test_state_rejects_invalid_config() {
        let handlers = Arc::new(Handlers::new(
            Arc::new(NoopStore),
            RetryPolicy::default(),
            "cursor_mcp",
            false,
            50,
        ));
        let result = SseAppState::new(
            handlers,
            SseConfig {
                buffer_size: 0,
                ..Default::default()
            },
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_broadcast_counts_receivers() {
        let state = state();
        assert_eq!(state.broadcast("{}".to_string()), 0);

        let mut rx = state.subscribe();
        assert_eq!(state.broadcast(r#"{"jsonrpc":"2.0"}"#.to_string()), 1);
        assert_eq!(rx.try_recv().unwrap(), r#"{"jsonrpc":"2.0"}"#);
    }

    #[tokio::test]
    async fn test_messages_endpoint_broadcasts_response() {
        let state = state();
        let mut rx = state.subscribe();

        let body = r#"{"jsonrpc":"2.0","id":7,"method":"tools/list"}"#.to_string();
        let status = messages_handler(State(state.clone()), body).await;
        assert_eq!(status, StatusCode::ACCEPTED);

        let broadcast: serde_json::Value =
            serde_json::from_str(&rx.try_recv().unwrap()).unwrap();
        assert_eq!(broadcast["id"], 7);
        assert_eq!(broadcast["result"]["tools"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_messages_endpoint_broadcasts_parse_error() {
        let state = state();
        let mut rx = state.subscribe();

        let status = messages_handler(State(state.clone()), "not json".to_string()).await;
        assert_eq!(status, StatusCode::ACCEPTED);

        let broadcast: serde_json::Value =
            serde_json::from_str(&rx.try_recv().unwrap()).unwrap();
        assert_eq!(broadcast["error"]["code"], error_codes::PARSE_ERROR);
    }

    #[tokio::test]
    async fn test_notification_is_not_broadcast() {
        let state = state();
        let mut rx = state.subscribe();

        let body = r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#.to_string();
        let status = messages_handler(State(state.clone()), body).await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_create_sse_router() {
        let _router = create_sse_router(state());
    }
}
