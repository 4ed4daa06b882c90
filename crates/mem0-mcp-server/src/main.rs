//! mem0 MCP server binary.
//!
//! Composition root: loads configuration from the environment, applies CLI
//! overrides, constructs the cached mem0 client, pushes the project
//! extraction instructions, and runs the selected transport.
//!
//! stdout is reserved for the JSON-RPC protocol; all logging goes to stderr.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use mem0_mcp_core::{ClientCache, Config, Mem0Config, MemoryStoreClient};
use mem0_mcp_server::tools::CUSTOM_INSTRUCTIONS;
use mem0_mcp_server::{McpServer, TransportMode};

/// Command-line overrides for environment configuration.
#[derive(Debug, Default)]
struct CliArgs {
    api_key: Option<String>,
    user_id: Option<String>,
    transport: Option<String>,
    bind: Option<String>,
    port: Option<u16>,
    help: bool,
}

impl CliArgs {
    fn parse(args: impl Iterator<Item = String>) -> Result<Self> {
        let mut parsed = Self::default();
        let mut args = args.peekable();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--api-key" => parsed.api_key = Some(required_value(&arg, args.next())?),
                "--user-id" => parsed.user_id = Some(required_value(&arg, args.next())?),
                "--transport" => parsed.transport = Some(required_value(&arg, args.next())?),
                "--bind" => parsed.bind = Some(required_value(&arg, args.next())?),
                "--port" => {
                    let value = required_value(&arg, args.next())?;
                    parsed.port = Some(
                        value
                            .parse()
                            .with_context(|| format!("invalid port '{}'", value))?,
                    );
                }
                "--help" | "-h" => parsed.help = true,
                other => bail!("unknown argument '{}' (see --help)", other),
            }
        }

        Ok(parsed)
    }
}

fn required_value(flag: &str, value: Option<String>) -> Result<String> {
    value.with_context(|| format!("{} requires a value", flag))
}

fn print_help() {
    eprintln!(
        "mem0-mcp-server {}\n\
         \n\
         MCP server exposing mem0-backed coding-preference tools.\n\
         \n\
         USAGE:\n\
         \x20   mem0-mcp-server [OPTIONS]\n\
         \n\
         OPTIONS:\n\
         \x20   --api-key <KEY>        mem0 API key (overrides MEM0_API_KEY)\n\
         \x20   --user-id <ID>         default user identity (overrides MEM0_USER_ID)\n\
         \x20   --transport <MODE>     'stdio' (default) or 'sse'\n\
         \x20   --bind <ADDRESS>       SSE bind address (overrides MEM0_MCP_BIND_ADDRESS)\n\
         \x20   --port <PORT>          SSE port (overrides MEM0_MCP_SSE_PORT)\n\
         \x20   -h, --help             print this help\n\
         \n\
         ENVIRONMENT:\n\
         \x20   MEM0_API_KEY           mem0 API key (required unless --api-key is given)\n\
         \x20   MEM0_BASE_URL          mem0 API base URL\n\
         \x20   MEM0_USER_ID           default user identity\n\
         \x20   MEM0_ENABLE_GRAPH      default graph processing flag (true/false)\n\
         \x20   RUST_LOG               log filter (logs go to stderr)",
        env!("CARGO_PKG_VERSION")
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the protocol; logs must go to stderr only.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse(std::env::args().skip(1))?;
    if args.help {
        print_help();
        return Ok(());
    }

    let mut config = Config::from_env();
    if let Some(api_key) = args.api_key {
        config.mem0.api_key = Some(api_key);
    }
    if let Some(user_id) = args.user_id {
        config.mem0.default_user_id = user_id;
    }
    if let Some(transport) = args.transport {
        config.mcp.transport = transport;
    }
    if let Some(bind) = args.bind {
        config.mcp.bind_address = bind;
    }
    if let Some(port) = args.port {
        config.mcp.sse_port = port;
    }
    config.validate().context("invalid configuration")?;

    let mode: TransportMode = config
        .mcp
        .transport
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    let api_key = config
        .mem0
        .api_key
        .clone()
        .context("MEM0_API_KEY is not set (or pass --api-key)")?;

    // One client per API key for the life of the process.
    let cache = ClientCache::new(Mem0Config {
        base_url: config.mem0.base_url.clone(),
        timeout_secs: config.mem0.timeout_secs,
    });
    let client = cache
        .get_or_create(&api_key)
        .context("failed to construct mem0 client")?;
    info!("mem0 client ready (base_url={})", config.mem0.base_url);

    // Push extraction instructions; the server still works if this fails.
    let store: Arc<dyn MemoryStoreClient> = client;
    match store.update_project(CUSTOM_INSTRUCTIONS).await {
        Ok(_) => info!("Updated project custom instructions"),
        Err(e) => warn!("Failed to update project custom instructions: {}", e),
    }

    let server = McpServer::new(config, store);
    server.run(mode).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args<'a>(list: &'a [&'a str]) -> impl Iterator<Item = String> + 'a {
        list.iter().map(|s| s.to_string())
    }

    #[test]
    fn test_parse_no_args() {
        let parsed = CliArgs::parse(args(&[])).unwrap();
        assert!(parsed.api_key.is_none());
        assert!(!parsed.help);
    }

    #[test]
    fn test_parse_overrides() {
        let parsed = CliArgs::parse(args(&[
            "--api-key",
            "m0-test-key-123",
            "--transport",
            "sse",
            "--port",
            "9000",
        ]))
        .unwrap();
        assert_eq!(parsed.api_key.as_deref(), Some("m0-test-key-123"));
        assert_eq!(parsed.transport.as_deref(), Some("sse"));
        assert_eq!(parsed.port, Some(9000));
    }

    #[test]
    fn test_parse_rejects_unknown_flag() {
        assert!(CliArgs::parse(args(&["--nope"])).is_err());
    }

    #[test]
    fn test_parse_rejects_missing_value() {
        assert!(CliArgs::parse(args(&["--api-key"])).is_err());
    }

    #[test]
    fn test_parse_rejects_bad_port() {
        assert!(CliArgs::parse(args(&["--port", "not-a-port"])).is_err());
    }

    #[test]
    fn test_parse_help() {
        assert!(CliArgs::parse(args(&["-h"])).unwrap().help);
        assert!(CliArgs::parse(args(&["--help"])).unwrap().help);
    }
}
