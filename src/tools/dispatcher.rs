//! Routes a `tools/call` request to its handler.
//!
//! Per invocation: gate on mutation class, look the tool up, coerce the
//! arguments, run the handler once, and wrap the outcome in an envelope.

use std::sync::Arc;

use rmcp::model::Tool as McpTool;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::coerce::{ArgumentMap, coerce};
use super::envelope::ToolEnvelope;
use super::error::ToolError;
use super::registry::{MutationClass, ToolRegistry};
use super::schema::ToolSchema;
use crate::gitea::GiteaClient;
use crate::types::ToolName;

/// Which mutation classes the dispatcher will run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessMode {
    /// Read and write tools are both available.
    #[default]
    Full,
    /// Only read tools; write tools are refused with `Forbidden`.
    ReadOnly,
}

impl AccessMode {
    pub fn from_read_only(read_only: bool) -> Self {
        if read_only { Self::ReadOnly } else { Self::Full }
    }

    pub fn is_restricted(self) -> bool {
        self == Self::ReadOnly
    }
}

/// Per-request state passed to the dispatcher.
#[derive(Clone)]
pub struct ToolContext {
    /// Gitea client carrying the caller's credentials.
    pub client: GiteaClient,
    /// Cancelled when the caller abandons the request.
    pub cancellation: CancellationToken,
}

impl ToolContext {
    pub fn new(client: GiteaClient, cancellation: CancellationToken) -> Self {
        Self {
            client,
            cancellation,
        }
    }
}

/// Stateless front door to the registry.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
    mode: AccessMode,
}

impl Dispatcher {
    pub fn new(registry: Arc<ToolRegistry>, mode: AccessMode) -> Self {
        Self { registry, mode }
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    /// Schemas callers may see in this mode.
    pub fn advertised_tools(&self) -> Vec<&ToolSchema> {
        self.registry.all_tools(!self.mode.is_restricted())
    }

    /// `tools/list` payload for this mode.
    pub fn advertised_mcp_tools(&self) -> Vec<McpTool> {
        self.registry.to_mcp_tools(!self.mode.is_restricted())
    }

    /// Invoke `name` and wrap the outcome. Never fails or panics on bad input.
    pub async fn invoke(&self, name: &str, args: ArgumentMap, ctx: ToolContext) -> ToolEnvelope {
        let result = self.try_invoke(name, &args, ctx).await;
        match &result {
            Ok(_) => debug!(tool = %name, "tool call succeeded"),
            Err(err) if err.is_client_input() => debug!(tool = %name, error = %err, "tool call rejected"),
            Err(err) => warn!(tool = %name, error = %err, "tool call failed"),
        }
        ToolEnvelope::from_result(result)
    }

    /// Same as [`invoke`](Self::invoke) but keeps the typed error.
    pub async fn try_invoke(
        &self,
        name: &str,
        args: &ArgumentMap,
        ctx: ToolContext,
    ) -> Result<Value, ToolError> {
        debug!(tool = %name, "tool call received");

        if self.mode.is_restricted()
            && self.registry.mutation_class(name) == Some(MutationClass::Write)
        {
            return Err(ToolError::Forbidden(ToolName::new(name)));
        }

        let entry = self
            .registry
            .lookup(name)
            .ok_or_else(|| ToolError::UnknownTool(ToolName::new(name)))?;

        let coerced = coerce(entry.schema(), args)?;

        let call = entry.handler().call(coerced, ctx.client);
        tokio::select! {
            biased;
            _ = ctx.cancellation.cancelled() => Err(ToolError::Cancelled(entry.name().clone())),
            outcome = call => outcome.map_err(ToolError::ExternalService),
        }
    }
}
