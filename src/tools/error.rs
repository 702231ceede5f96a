//! Error types for tool registration and dispatch.
//!
//! `RegistryError` only occurs while the catalog is being built and is fatal
//! to startup. `ToolError` covers everything that can go wrong for a single
//! invocation; the dispatcher turns it into a failure envelope.

use thiserror::Error;

use crate::types::{ParameterName, ToolName};

/// Errors raised while building a [`ToolRegistry`](super::ToolRegistry).
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A tool with this name is already registered (in either class).
    #[error("tool `{0}` is already registered")]
    DuplicateTool(ToolName),

    /// A schema violates a declaration invariant.
    #[error("tool `{tool}` parameter `{parameter}`: {reason}")]
    InvalidSchema {
        tool: ToolName,
        parameter: ParameterName,
        reason: String,
    },
}

/// Errors produced while handling one tool invocation.
#[derive(Debug, Error)]
pub enum ToolError {
    /// A required parameter was absent from the argument map.
    #[error("{name} is required")]
    MissingParameter { name: ParameterName },

    /// A parameter was present with the wrong representation.
    #[error("{name} must be {expected}")]
    InvalidParameterType {
        name: ParameterName,
        expected: &'static str,
    },

    /// A string parameter fell outside its enum constraint.
    #[error("{name} must be one of: {}", allowed.join(", "))]
    InvalidParameterValue {
        name: ParameterName,
        allowed: Vec<String>,
    },

    /// One element of an array parameter was invalid.
    #[error("{name}[{index}] must be {expected}")]
    InvalidArrayElement {
        name: ParameterName,
        index: usize,
        expected: &'static str,
    },

    /// No tool with this name is registered.
    #[error("unknown tool: {0}")]
    UnknownTool(ToolName),

    /// The tool exists but mutates state and the server is read-only.
    #[error("tool {0} is not permitted: server is running in read-only mode")]
    Forbidden(ToolName),

    /// The Gitea call behind the tool failed.
    #[error("{0:#}")]
    ExternalService(anyhow::Error),

    /// The request was cancelled while the tool was running.
    #[error("tool {0} was cancelled")]
    Cancelled(ToolName),
}

impl ToolError {
    /// True for errors caused by the caller's arguments.
    pub fn is_client_input(&self) -> bool {
        matches!(
            self,
            Self::MissingParameter { .. }
                | Self::InvalidParameterType { .. }
                | Self::InvalidParameterValue { .. }
                | Self::InvalidArrayElement { .. }
        )
    }
}
