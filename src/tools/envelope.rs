//! The uniform success/failure wrapper returned from every invocation.

use rmcp::model::{CallToolResult, Content};
use serde_json::Value;

use super::error::ToolError;

/// Outcome of one tool call, ready for the transport.
///
/// This is the only place internal error kinds become text; nothing past
/// the envelope can recover which [`ToolError`] variant produced a failure.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolEnvelope {
    Success(Value),
    Failure(String),
}

impl ToolEnvelope {
    pub fn success(payload: Value) -> Self {
        Self::Success(payload)
    }

    /// Render `err` as a single human-readable line.
    pub fn failure(err: &ToolError) -> Self {
        let message = err
            .to_string()
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        Self::Failure(message)
    }

    pub fn from_result(result: Result<Value, ToolError>) -> Self {
        match result {
            Ok(payload) => Self::success(payload),
            Err(err) => Self::failure(&err),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// Text placed in the protocol's content block.
    ///
    /// String payloads (confirmation messages) are emitted as-is; anything
    /// else is pretty-printed JSON.
    pub fn text(&self) -> String {
        match self {
            Self::Success(Value::String(s)) => s.clone(),
            Self::Success(payload) => serde_json::to_string_pretty(payload)
                .unwrap_or_else(|_| "internal serialization error".to_string()),
            Self::Failure(message) => message.clone(),
        }
    }

    pub fn into_call_result(self) -> CallToolResult {
        let is_error = self.is_error();
        CallToolResult {
            content: vec![Content::text(self.text())],
            structured_content: None,
            is_error: Some(is_error),
            meta: None,
        }
    }
}
