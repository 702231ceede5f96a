//! Tool declaration, registration and dispatch.
//!
//! Tools are declared as a [`ToolSchema`] plus a handler, collected into a
//! [`ToolRegistry`] split by [`MutationClass`], and invoked through a
//! [`Dispatcher`] that enforces read-only mode and turns every outcome into
//! a [`ToolEnvelope`].

mod coerce;
mod dispatcher;
mod envelope;
mod error;
mod registry;
mod schema;

pub mod catalog;

#[cfg(test)]
mod integration_tests;

pub use coerce::{ArgValue, ArgumentMap, ToolArgs, coerce};
pub use dispatcher::{AccessMode, Dispatcher, ToolContext};
pub use envelope::ToolEnvelope;
pub use error::{RegistryError, ToolError};
pub use registry::{HandlerFuture, MutationClass, ToolEntry, ToolHandler, ToolRegistry};
pub use schema::{MAX_SAFE_INTEGER, ParameterKind, ParameterSpec, ToolSchema};
