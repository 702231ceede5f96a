// Core modules
pub mod config;
pub mod gitea;
pub mod server;
pub mod tools;
pub mod types;

// Re-export key types and functions
pub use config::ServerConfig;
pub use gitea::{GiteaClient, GiteaTransport, HttpTransport};
pub use server::GiteaMcpServer;
pub use tools::{AccessMode, Dispatcher, ToolEnvelope, ToolError, ToolRegistry};
pub use types::{AccessToken, ParameterName, ToolName};

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

/// Convenience function to create a fully configured MCP server.
///
/// Validates the config, registers the full tool catalog and wires a
/// dispatcher in the configured access mode to an HTTP-backed Gitea client.
pub async fn create_server(config: &ServerConfig) -> Result<Arc<GiteaMcpServer>> {
    config.validate()?;

    let registry = Arc::new(tools::catalog::default_registry()?);
    let mode = AccessMode::from_read_only(config.read_only);
    let dispatcher = Arc::new(Dispatcher::new(registry, mode));
    let client = GiteaClient::from_config(config)?;

    info!(
        host = %config.host,
        tools = dispatcher.advertised_tools().len(),
        authenticated = client.has_token(),
        "Gitea MCP server ready ({:?} mode)",
        mode
    );

    Ok(Arc::new(GiteaMcpServer::new(dispatcher, client)))
}
