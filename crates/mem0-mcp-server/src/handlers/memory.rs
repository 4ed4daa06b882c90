//! Coding-preference tool implementations.
//!
//! Each tool builds a project-scoped filter expression, calls mem0 through
//! the resilient invoker, and renders the serialized outcome as an MCP tool
//! result. The invoker always returns a JSON string: the success payload, or
//! `{"error": ..., "status": ...}` when the call failed. A payload carrying
//! an "error" key becomes an `isError` tool result rather than a JSON-RPC
//! error, so clients see tool failures inline.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::warn;

use mem0_mcp_core::{
    default_enable_graph, flatten_results, invoke, project_filter, with_default_filters,
};

use crate::protocol::{error_codes, JsonRpcId, JsonRpcResponse};
use crate::tools::DEFAULT_PROJECT;

impl super::Handlers {
    /// Store a coding preference, tagged with a project.
    pub(super) async fn call_add_coding_preference(
        &self,
        id: Option<JsonRpcId>,
        arguments: Value,
    ) -> JsonRpcResponse {
        let text = match arguments.get("text").and_then(|v| v.as_str()) {
            Some(t) => t.to_string(),
            None => {
                return JsonRpcResponse::error(
                    id,
                    error_codes::INVALID_PARAMS,
                    "Missing 'text' argument for add_coding_preference",
                );
            }
        };
        let project = project_argument(&arguments);
        let enable_graph = default_enable_graph(
            arguments.get("enable_graph").and_then(|v| v.as_bool()),
            self.enable_graph,
        );

        let client = Arc::clone(&self.client);
        let user_id = self.default_user_id.clone();
        let messages = json!([{ "role": "user", "content": text.clone() }]);
        let metadata = json!({ "project": project.clone() });

        let outcome = invoke(&self.retry, move || {
            let client = Arc::clone(&client);
            let user_id = user_id.clone();
            let messages = messages.clone();
            let metadata = metadata.clone();
            async move {
                client
                    .add(messages, &user_id, metadata, enable_graph)
                    .await
            }
        })
        .await;

        let payload = match parse_outcome(&outcome) {
            Ok(p) => p,
            Err(resp) => return self.tool_result(id, resp, true),
        };
        if payload.get("error").is_some() {
            warn!(project = %project, "add_coding_preference failed");
            return self.tool_result(id, outcome, true);
        }

        let message = match extract_memory_id(&payload) {
            Some(memory_id) => format!(
                "Successfully added preference with ID {} for project '{}': {}",
                memory_id, project, text
            ),
            None => format!(
                "Successfully added preference for project '{}': {}",
                project, text
            ),
        };
        self.tool_result(id, message, false)
    }

    /// Return all preferences stored for a project.
    pub(super) async fn call_get_all_coding_preferences(
        &self,
        id: Option<JsonRpcId>,
        arguments: Value,
    ) -> JsonRpcResponse {
        let project = project_argument(&arguments);
        let filters = with_default_filters(&self.default_user_id, Some(project_filter(&project)));

        let client = Arc::clone(&self.client);
        let page_size = self.page_size;

        let outcome = invoke(&self.retry, move || {
            let client = Arc::clone(&client);
            let filters = filters.clone();
            async move {
                let response = client.get_all(filters, 1, page_size).await?;
                Ok(Value::Array(flatten_results(response)))
            }
        })
        .await;

        self.render_list_outcome(id, &project, outcome)
    }

    /// Semantic search over a project's preferences.
    pub(super) async fn call_search_coding_preferences(
        &self,
        id: Option<JsonRpcId>,
        arguments: Value,
    ) -> JsonRpcResponse {
        let query = match arguments.get("query").and_then(|v| v.as_str()) {
            Some(q) => q.to_string(),
            None => {
                return JsonRpcResponse::error(
                    id,
                    error_codes::INVALID_PARAMS,
                    "Missing 'query' argument for search_coding_preferences",
                );
            }
        };
        let project = project_argument(&arguments);
        let enable_graph = default_enable_graph(
            arguments.get("enable_graph").and_then(|v| v.as_bool()),
            self.enable_graph,
        );
        let filters = with_default_filters(&self.default_user_id, Some(project_filter(&project)));

        let client = Arc::clone(&self.client);

        let outcome = invoke(&self.retry, move || {
            let client = Arc::clone(&client);
            let query = query.clone();
            let filters = filters.clone();
            async move {
                let response = client.search(&query, filters, enable_graph).await?;
                Ok(Value::Array(flatten_results(response)))
            }
        })
        .await;

        self.render_list_outcome(id, &project, outcome)
    }

    /// Render a list-producing outcome as a pretty-printed tool result.
    fn render_list_outcome(
        &self,
        id: Option<JsonRpcId>,
        project: &str,
        outcome: String,
    ) -> JsonRpcResponse {
        let payload = match parse_outcome(&outcome) {
            Ok(p) => p,
            Err(resp) => return self.tool_result(id, resp, true),
        };
        if payload.get("error").is_some() {
            warn!(project = %project, "mem0 list operation failed");
            return self.tool_result(id, outcome, true);
        }

        match serde_json::to_string_pretty(&payload) {
            Ok(pretty) => self.tool_result(id, pretty, false),
            Err(e) => self.tool_result(id, format!("Failed to render results: {}", e), true),
        }
    }
}

/// Read the project argument, falling back to the default project.
fn project_argument(arguments: &Value) -> String {
    arguments
        .get("project")
        .and_then(|v| v.as_str())
        .unwrap_or(DEFAULT_PROJECT)
        .to_string()
}

/// Parse the invoker's serialized outcome back into a JSON value.
///
/// The invoker only emits strings it serialized itself, so a parse failure
/// is surfaced as an error tool result rather than a panic.
fn parse_outcome(outcome: &str) -> Result<Value, String> {
    serde_json::from_str(outcome)
        .map_err(|e| format!("Malformed mem0 response: {} ({})", outcome, e))
}

/// Pull the stored memory id out of the add response, whatever its shape.
///
/// The v1.1 output format returns `{"results": [{"id": ...}]}`; older
/// deployments return a bare object or a bare list.
fn extract_memory_id(payload: &Value) -> Option<String> {
    let candidate = match payload {
        Value::Object(map) => match map.get("results") {
            Some(Value::Array(items)) => items.first(),
            _ => Some(payload),
        },
        Value::Array(items) => items.first(),
        _ => None,
    };

    candidate
        .and_then(|v| v.get("id"))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}
