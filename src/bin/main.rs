use std::time::Duration;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use gitea_mcp::config::{DEFAULT_BIND, DEFAULT_HOST, DEFAULT_TIMEOUT_SECS, normalize_host};
use gitea_mcp::{ServerConfig, create_server};
use tracing::info;
use tracing_subscriber::EnvFilter;

// rmcp imports for MCP stdio server mode
use rmcp::service::ServiceExt;
use rmcp::transport::stdio;

#[derive(Parser)]
#[command(name = "gitea-mcp")]
#[command(about = "MCP server exposing Gitea repositories as tools")]
struct Cli {
    #[command(flatten)]
    gitea: GiteaArgs,

    /// Log at debug level; ignored when RUST_LOG is set
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GiteaArgs {
    /// Gitea instance URL
    #[arg(long, env = "GITEA_HOST", default_value = DEFAULT_HOST, global = true)]
    host: String,
    /// Personal access token used for Gitea API calls
    #[arg(long, env = "GITEA_ACCESS_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,
    /// Only expose tools that do not change repository state
    #[arg(long, env = "GITEA_READONLY", global = true)]
    read_only: bool,
    /// Skip TLS certificate verification
    #[arg(long, env = "GITEA_INSECURE", global = true)]
    insecure: bool,
    /// Timeout for each Gitea API request, in seconds
    #[arg(long, env = "GITEA_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS, global = true)]
    timeout_secs: u64,
}

impl GiteaArgs {
    fn into_config(self) -> Result<ServerConfig> {
        Ok(ServerConfig::for_host(normalize_host(&self.host)?)
            .with_token(self.token)
            .with_read_only(self.read_only)
            .with_insecure(self.insecure)
            .with_timeout(Duration::from_secs(self.timeout_secs)))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run as an MCP stdio server (for use in mcp.json)
    Stdio,
    /// Run as an MCP streamable HTTP server
    Http {
        /// Bind address, e.g. 0.0.0.0:8080
        #[arg(long, env = "GITEA_MCP_BIND", default_value = DEFAULT_BIND)]
        bind: String,
    },
    /// Print the advertised tool catalog as JSON
    ListTools,
}

/// `RUST_LOG` when set, otherwise the crate at info (or debug) and rmcp at warn.
fn log_filter(debug: bool) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    let level = if debug { "debug" } else { "info" };
    Ok(EnvFilter::new(format!("gitea_mcp={level}")).add_directive("rmcp=warn".parse()?))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.debug)?)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.gitea.into_config()?;

    match cli.command {
        Commands::Stdio => {
            info!("Starting MCP stdio server for {}", config.host);
            let server = create_server(&config).await?;

            let service = server
                .as_ref()
                .clone()
                .serve(stdio())
                .await
                .inspect_err(|e| tracing::error!("serving error: {:?}", e))?;

            // Block until the MCP session ends.
            service.waiting().await?;
            info!("MCP stdio server session ended");
        }
        Commands::Http { bind } => {
            let config = config.with_bind(bind);
            info!("Starting MCP HTTP server on {} for {}", config.bind, config.host);
            let server = create_server(&config).await?;
            gitea_mcp::server::start_mcp_http(server, &config.bind).await?;
        }
        Commands::ListTools => {
            let server = create_server(&config).await?;
            let tools = server.dispatcher().advertised_mcp_tools();
            println!("{}", serde_json::to_string_pretty(&tools)?);
        }
    }

    Ok(())
}
