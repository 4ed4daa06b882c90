//! Server configuration.
//!
//! Values resolve with the priority: CLI arguments (applied by the binary) >
//! environment variables > defaults. `validate()` is called after all
//! overrides are applied and fails fast on anything the server cannot run
//! with.

use std::env;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Default identity used when no explicit user id is configured.
pub const DEFAULT_USER_ID: &str = "cursor_mcp";

/// Default mem0 API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.mem0.ai";

/// Page size used for get_all requests.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// mem0 service settings.
    pub mem0: Mem0Settings,
    /// MCP transport settings.
    pub mcp: McpSettings,
}

/// Settings for the external mem0 service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mem0Settings {
    /// API key. Must be present (env `MEM0_API_KEY` or `--api-key`) before
    /// the server can construct a client.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Base URL of the mem0 API.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Identity every call is scoped to unless the caller supplies one.
    pub default_user_id: String,
    /// Default for mem0's graph-memory feature; tool calls may override.
    pub enable_graph: bool,
    /// Page size for get_all requests.
    pub page_size: usize,
}

/// Settings for the MCP transport layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpSettings {
    /// Transport mode: "stdio" or "sse".
    pub transport: String,
    /// Bind address for the SSE transport.
    pub bind_address: String,
    /// Port for the SSE transport.
    pub sse_port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mem0: Mem0Settings {
                api_key: None,
                base_url: DEFAULT_BASE_URL.to_string(),
                timeout_secs: 30,
                default_user_id: DEFAULT_USER_ID.to_string(),
                enable_graph: false,
                page_size: DEFAULT_PAGE_SIZE,
            },
            mcp: McpSettings {
                transport: "stdio".to_string(),
                bind_address: "127.0.0.1".to_string(),
                sse_port: 8080,
            },
        }
    }
}

impl Config {
    /// Build a config from defaults plus environment overrides.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(key) = env::var("MEM0_API_KEY") {
            if !key.is_empty() {
                config.mem0.api_key = Some(key);
            }
        }
        if let Ok(url) = env::var("MEM0_BASE_URL") {
            if !url.is_empty() {
                config.mem0.base_url = url;
            }
        }
        if let Ok(user) = env::var("MEM0_USER_ID") {
            if !user.is_empty() {
                config.mem0.default_user_id = user;
            }
        }
        if let Ok(graph) = env::var("MEM0_ENABLE_GRAPH") {
            config.mem0.enable_graph = graph == "1" || graph.eq_ignore_ascii_case("true");
        }
        if let Ok(transport) = env::var("MEM0_MCP_TRANSPORT") {
            if !transport.is_empty() {
                config.mcp.transport = transport;
            }
        }
        if let Ok(bind) = env::var("MEM0_MCP_BIND_ADDRESS") {
            if !bind.is_empty() {
                config.mcp.bind_address = bind;
            }
        }
        if let Ok(port) = env::var("MEM0_MCP_SSE_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                config.mcp.sse_port = port;
            }
        }

        config
    }

    /// Validate the configuration after all overrides are applied.
    pub fn validate(&self) -> CoreResult<()> {
        match self.mcp.transport.as_str() {
            "stdio" | "sse" => {}
            other => {
                return Err(CoreError::Config(format!(
                    "Invalid transport '{}'. Must be 'stdio' or 'sse'.",
                    other
                )));
            }
        }
        if self.mem0.base_url.is_empty() {
            return Err(CoreError::Config("mem0.base_url cannot be empty".to_string()));
        }
        if self.mem0.default_user_id.is_empty() {
            return Err(CoreError::Config(
                "mem0.default_user_id cannot be empty".to_string(),
            ));
        }
        if self.mem0.page_size == 0 {
            return Err(CoreError::Config("mem0.page_size must be > 0".to_string()));
        }
        if self.mem0.timeout_secs == 0 {
            return Err(CoreError::Config("mem0.timeout_secs must be > 0".to_string()));
        }
        Ok(())
    }
}

/// Resolve the effective graph-memory flag for one call.
///
/// A per-call value always wins; absence falls back to the configured
/// default.
pub fn default_enable_graph(explicit: Option<bool>, default: bool) -> bool {
    explicit.unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.mem0.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.mem0.default_user_id, "cursor_mcp");
        assert_eq!(config.mem0.page_size, 50);
        assert!(!config.mem0.enable_graph);
        assert_eq!(config.mcp.transport, "stdio");
        assert_eq!(config.mcp.sse_port, 8080);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_transport() {
        let mut config = Config::default();
        config.mcp.transport = "tcp".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_user() {
        let mut config = Config::default();
        config.mem0.default_user_id = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_page_size() {
        let mut config = Config::default();
        config.mem0.page_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_enable_graph_explicit_overrides_default() {
        assert!(default_enable_graph(Some(true), false));
        assert!(!default_enable_graph(Some(false), true));
    }

    #[test]
    fn test_enable_graph_none_uses_default() {
        assert!(default_enable_graph(None, true));
        assert!(!default_enable_graph(None, false));
    }
}
