//! MCP server implementation using rmcp.
//!
//! Exposes the tool catalog over stdio or streamable HTTP.

use std::sync::Arc;

use anyhow::Result;
use axum::{Router, http::StatusCode, response::Json, routing::get};
use http::HeaderMap;
use rmcp::transport::streamable_http_server::{
    StreamableHttpService, session::local::LocalSessionManager,
};
use rmcp::{
    ErrorData as McpError,
    handler::server::ServerHandler,
    model::*,
    service::{RequestContext, RoleServer},
};
use serde_json::Value;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::gitea::GiteaClient;
use crate::tools::{AccessMode, Dispatcher, ToolContext};
use crate::types::AccessToken;

/// Type alias for HTTP request parts stored in rmcp extensions.
type HttpParts = http::request::Parts;

/// MCP server that forwards `tools/*` requests to the dispatcher.
#[derive(Clone)]
pub struct GiteaMcpServer {
    dispatcher: Arc<Dispatcher>,
    client: GiteaClient,
}

impl GiteaMcpServer {
    pub fn new(dispatcher: Arc<Dispatcher>, client: GiteaClient) -> Self {
        Self { dispatcher, client }
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    pub fn client(&self) -> &GiteaClient {
        &self.client
    }

    /// Client for one request: an `Authorization` header on the HTTP request
    /// replaces the configured token.
    fn client_for(&self, context: &RequestContext<RoleServer>) -> GiteaClient {
        let token = context
            .extensions
            .get::<HttpParts>()
            .and_then(|parts| bearer_token(&parts.headers));
        self.client.with_token(token)
    }
}

impl ServerHandler for GiteaMcpServer {
    fn ping(
        &self,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<(), McpError>> + Send + '_ {
        std::future::ready(Ok(()))
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        let result = ListToolsResult {
            tools: self.dispatcher.advertised_mcp_tools(),
            next_cursor: None,
            ..Default::default()
        };
        std::future::ready(Ok(result))
    }

    fn call_tool(
        &self,
        request: CallToolRequestParams,
        context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        let tool_name = request.name.to_string();
        let args = request.arguments.unwrap_or_default();
        let ctx = ToolContext::new(self.client_for(&context), context.ct.clone());
        let dispatcher = self.dispatcher.clone();

        async move {
            let envelope = dispatcher.invoke(&tool_name, args, ctx).await;
            Ok(envelope.into_call_result())
        }
    }

    fn get_info(&self) -> ServerInfo {
        let mode = match self.dispatcher.mode() {
            AccessMode::Full => "",
            AccessMode::ReadOnly => " The server is read-only; tools that change state are unavailable.",
        };
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_06_18,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(format!(
                "Gitea MCP server: manage labels, pull requests, branches and files \
                 of Gitea repositories.{mode}"
            )),
        }
    }
}

/// Token from an `Authorization: Bearer <t>` or `Authorization: token <t>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<AccessToken> {
    let value = headers.get(http::header::AUTHORIZATION)?.to_str().ok()?.trim();
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    let known = scheme.eq_ignore_ascii_case("bearer") || scheme.eq_ignore_ascii_case("token");
    (known && !token.is_empty()).then(|| AccessToken::new(token))
}

async fn health_check() -> Result<Json<Value>, StatusCode> {
    Ok(Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    })))
}

/// Build the HTTP router: MCP at `/mcp`, liveness at `/health`.
pub fn router(server: Arc<GiteaMcpServer>) -> Router {
    let service = StreamableHttpService::new(
        move || Ok(server.as_ref().clone()),
        LocalSessionManager::default().into(),
        Default::default(),
    );

    Router::new()
        .route("/health", get(health_check))
        .nest_service("/mcp", service)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

/// Serve MCP over streamable HTTP on `bind`, e.g. `127.0.0.1:8080`.
pub async fn start_mcp_http(server: Arc<GiteaMcpServer>, bind: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!(
        "MCP HTTP server listening on http://{}/mcp ({:?} mode)",
        bind,
        server.dispatcher().mode()
    );
    axum::serve(listener, router(server)).await?;
    Ok(())
}
