//! HTTP client for the mem0 memory-store API.
//!
//! Thin async wrapper over the three operations the MCP tools need (add,
//! get_all, search) plus the project-instructions update pushed at startup.
//! The add endpoint speaks the v1.1 output format; get_all and search use the
//! v2 API, which takes the full filter expression produced by
//! [`crate::filters::with_default_filters`].

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::{CoreError, CoreResult, ServiceError};

/// Required prefix of a mem0 API key.
pub const API_KEY_PREFIX: &str = "m0-";

/// Minimum total length of a mem0 API key.
pub const API_KEY_MIN_LEN: usize = 10;

/// Validate the mem0 API key format.
///
/// Runs before any cache lookup or client construction; a malformed key is a
/// deployment defect, not a per-call condition.
pub fn validate_api_key(api_key: &str) -> CoreResult<()> {
    if !api_key.starts_with(API_KEY_PREFIX) {
        return Err(CoreError::InvalidApiKey {
            reason: format!("must start with '{}'", API_KEY_PREFIX),
        });
    }
    if api_key.len() < API_KEY_MIN_LEN {
        return Err(CoreError::InvalidApiKey {
            reason: format!("must be at least {} characters", API_KEY_MIN_LEN),
        });
    }
    Ok(())
}

/// Configuration for [`Mem0Client`].
#[derive(Debug, Clone)]
pub struct Mem0Config {
    /// Base URL of the mem0 API.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for Mem0Config {
    fn default() -> Self {
        Self {
            base_url: crate::config::DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

/// Client-side view of the mem0 memory store.
///
/// Handlers depend on this trait rather than the concrete HTTP client so
/// they can be exercised against an in-memory double.
#[async_trait]
pub trait MemoryStoreClient: Send + Sync {
    /// Store messages for a user, tagged with metadata.
    async fn add(
        &self,
        messages: Value,
        user_id: &str,
        metadata: Value,
        enable_graph: bool,
    ) -> Result<Value, ServiceError>;

    /// Retrieve all memories matching a filter expression (v2 API, paged).
    async fn get_all(
        &self,
        filters: Value,
        page: usize,
        page_size: usize,
    ) -> Result<Value, ServiceError>;

    /// Semantic search over memories matching a filter expression (v2 API).
    async fn search(
        &self,
        query: &str,
        filters: Value,
        enable_graph: bool,
    ) -> Result<Value, ServiceError>;

    /// Update the project-level extraction instructions.
    async fn update_project(&self, custom_instructions: &str) -> Result<Value, ServiceError>;
}

/// reqwest-based mem0 API client, bound to exactly one API key.
#[derive(Debug)]
pub struct Mem0Client {
    api_key: String,
    config: Mem0Config,
    http: Client,
}

impl Mem0Client {
    /// Create a client for the given API key.
    ///
    /// Validates the key format first; construction never proceeds on a
    /// malformed key.
    pub fn new(api_key: &str, config: Mem0Config) -> CoreResult<Self> {
        validate_api_key(api_key)?;

        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CoreError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_key: api_key.to_string(),
            config,
            http,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    /// POST a JSON body and decode the JSON response.
    ///
    /// Non-2xx responses become a [`ServiceError`] carrying the HTTP status,
    /// which is what the retry classification operates on.
    async fn post_json(&self, path: &str, body: &Value) -> Result<Value, ServiceError> {
        let url = self.url(path);
        debug!(url = %url, "mem0 request");

        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("Token {}", self.api_key))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ServiceError::with_status(
                format!("mem0 request to {} failed: {}", path, detail.trim()),
                status.as_u16(),
            ));
        }

        Ok(response.json().await?)
    }

    async fn patch_json(&self, path: &str, body: &Value) -> Result<Value, ServiceError> {
        let url = self.url(path);
        debug!(url = %url, "mem0 request");

        let response = self
            .http
            .patch(&url)
            .header("Authorization", format!("Token {}", self.api_key))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ServiceError::with_status(
                format!("mem0 request to {} failed: {}", path, detail.trim()),
                status.as_u16(),
            ));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl MemoryStoreClient for Mem0Client {
    async fn add(
        &self,
        messages: Value,
        user_id: &str,
        metadata: Value,
        enable_graph: bool,
    ) -> Result<Value, ServiceError> {
        let mut body = json!({
            "messages": messages,
            "user_id": user_id,
            "output_format": "v1.1",
            "metadata": metadata,
        });
        if enable_graph {
            body["enable_graph"] = json!(true);
        }
        self.post_json("/v1/memories/", &body).await
    }

    async fn get_all(
        &self,
        filters: Value,
        page: usize,
        page_size: usize,
    ) -> Result<Value, ServiceError> {
        let body = json!({
            "filters": filters,
            "page": page,
            "page_size": page_size,
        });
        self.post_json("/v2/memories/", &body).await
    }

    async fn search(
        &self,
        query: &str,
        filters: Value,
        enable_graph: bool,
    ) -> Result<Value, ServiceError> {
        let mut body = json!({
            "query": query,
            "filters": filters,
        });
        if enable_graph {
            body["enable_graph"] = json!(true);
        }
        self.post_json("/v2/memories/search/", &body).await
    }

    async fn update_project(&self, custom_instructions: &str) -> Result<Value, ServiceError> {
        let body = json!({ "custom_instructions": custom_instructions });
        self.patch_json("/api/v1/orgs/projects/", &body).await
    }
}

/// Normalize a version-dependent response shape to a flat result list.
///
/// The v2 API returns a bare list for get_all and `{"results": [...]}` for
/// search; older versions wrap both. Anything unrecognized flattens to an
/// empty list.
pub fn flatten_results(response: Value) -> Vec<Value> {
    match response {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("results") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_api_key() {
        assert!(validate_api_key("m0-valid-key-12345").is_ok());
    }

    #[test]
    fn test_invalid_api_key_prefix() {
        let err = validate_api_key("invalid-key").unwrap_err();
        assert!(matches!(err, CoreError::InvalidApiKey { .. }));
        assert!(err.to_string().contains("Invalid MEM0_API_KEY format"));
    }

    #[test]
    fn test_invalid_api_key_length() {
        let err = validate_api_key("m0-short").unwrap_err();
        assert!(matches!(err, CoreError::InvalidApiKey { .. }));
    }

    #[test]
    fn test_client_rejects_bad_key_before_construction() {
        assert!(Mem0Client::new("nope", Mem0Config::default()).is_err());
        assert!(Mem0Client::new("m0-valid-key-12345", Mem0Config::default()).is_ok());
    }

    #[test]
    fn test_flatten_bare_list() {
        let response = json!([{ "id": "1" }, { "id": "2" }]);
        assert_eq!(flatten_results(response).len(), 2);
    }

    #[test]
    fn test_flatten_results_object() {
        let response = json!({ "results": [{ "id": "1" }], "query": "q" });
        let flat = flatten_results(response);
        assert_eq!(flat.len(), 1);
        assert_eq!(flat[0]["id"], "1");
    }

    #[test]
    fn test_flatten_unrecognized_shape() {
        assert!(flatten_results(json!({ "unexpected": true })).is_empty());
        assert!(flatten_results(json!(null)).is_empty());
        assert!(flatten_results(json!("text")).is_empty());
    }

    #[test]
    fn test_url_building() {
        let client = Mem0Client::new("m0-valid-key-12345", Mem0Config::default()).unwrap();
        assert_eq!(client.url("/v2/memories/"), "https://api.mem0.ai/v2/memories/");
    }
}
