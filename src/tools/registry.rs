//! Tool registry for the Gitea tool catalog.
//!
//! Provides a `ToolHandler` trait for implementing tools and a `ToolRegistry`
//! that partitions them into read-only and mutating sets.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use rmcp::model::Tool as McpTool;
use serde_json::Value;

use super::coerce::ToolArgs;
use super::error::RegistryError;
use super::schema::ToolSchema;
use crate::gitea::GiteaClient;
use crate::types::ToolName;

/// Boxed future returned by a tool handler.
pub type HandlerFuture = Pin<Box<dyn Future<Output = anyhow::Result<Value>> + Send>>;

/// Whether a tool only observes remote state or changes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationClass {
    Read,
    Write,
}

/// Trait for handling tool invocations.
///
/// Implemented for every `Fn(ToolArgs, GiteaClient) -> impl Future`, so a
/// plain `async fn` is a handler.
pub trait ToolHandler: Send + Sync {
    /// Executes the tool with already-coerced arguments.
    fn call(&self, args: ToolArgs, client: GiteaClient) -> HandlerFuture;
}

impl<F, Fut> ToolHandler for F
where
    F: Fn(ToolArgs, GiteaClient) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
{
    fn call(&self, args: ToolArgs, client: GiteaClient) -> HandlerFuture {
        Box::pin(self(args, client))
    }
}

/// A schema paired with its handler and mutation class.
#[derive(Clone)]
pub struct ToolEntry {
    schema: ToolSchema,
    class: MutationClass,
    handler: Arc<dyn ToolHandler>,
}

impl ToolEntry {
    pub fn new<H: ToolHandler + 'static>(schema: ToolSchema, class: MutationClass, handler: H) -> Self {
        Self {
            schema,
            class,
            handler: Arc::new(handler),
        }
    }

    /// A tool that only reads remote state.
    pub fn read<H: ToolHandler + 'static>(schema: ToolSchema, handler: H) -> Self {
        Self::new(schema, MutationClass::Read, handler)
    }

    /// A tool that changes remote state.
    pub fn write<H: ToolHandler + 'static>(schema: ToolSchema, handler: H) -> Self {
        Self::new(schema, MutationClass::Write, handler)
    }

    pub fn name(&self) -> &ToolName {
        self.schema.name()
    }

    pub fn schema(&self) -> &ToolSchema {
        &self.schema
    }

    pub fn class(&self) -> MutationClass {
        self.class
    }

    pub fn handler(&self) -> &Arc<dyn ToolHandler> {
        &self.handler
    }

    pub fn to_mcp_tool(&self) -> McpTool {
        self.schema.to_mcp_tool(self.class)
    }
}

impl std::fmt::Debug for ToolEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolEntry")
            .field("name", self.name())
            .field("class", &self.class)
            .finish()
    }
}

/// Registry for managing tool entries.
///
/// Populated once at startup, then shared read-only behind an `Arc`.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    read: HashMap<ToolName, Arc<ToolEntry>>,
    write: HashMap<ToolName, Arc<ToolEntry>>,
    /// Registration order, used to advertise a stable catalog.
    order: Vec<ToolName>,
}

impl ToolRegistry {
    /// Create a new empty tool registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a read-only tool.
    pub fn register_read<H: ToolHandler + 'static>(
        &mut self,
        schema: ToolSchema,
        handler: H,
    ) -> Result<(), RegistryError> {
        self.register(ToolEntry::read(schema, handler))
    }

    /// Register a mutating tool.
    pub fn register_write<H: ToolHandler + 'static>(
        &mut self,
        schema: ToolSchema,
        handler: H,
    ) -> Result<(), RegistryError> {
        self.register(ToolEntry::write(schema, handler))
    }

    /// Register an entry into the set matching its class.
    ///
    /// Fails if the schema is malformed or the name is taken in either set.
    pub fn register(&mut self, entry: ToolEntry) -> Result<(), RegistryError> {
        entry.schema().validate()?;
        let name = entry.name().clone();
        if self.contains(name.as_str()) {
            return Err(RegistryError::DuplicateTool(name));
        }
        let set = match entry.class() {
            MutationClass::Read => &mut self.read,
            MutationClass::Write => &mut self.write,
        };
        set.insert(name.clone(), Arc::new(entry));
        self.order.push(name);
        Ok(())
    }

    /// Register every entry of a tool family table.
    pub fn register_all(
        &mut self,
        entries: impl IntoIterator<Item = ToolEntry>,
    ) -> Result<(), RegistryError> {
        entries.into_iter().try_for_each(|entry| self.register(entry))
    }

    /// Builder-style variant of [`register_all`](Self::register_all).
    pub fn with_tools(
        mut self,
        entries: impl IntoIterator<Item = ToolEntry>,
    ) -> Result<Self, RegistryError> {
        self.register_all(entries)?;
        Ok(self)
    }

    /// Get a tool entry by name.
    pub fn lookup(&self, name: &str) -> Option<Arc<ToolEntry>> {
        self.read
            .get(name)
            .or_else(|| self.write.get(name))
            .cloned()
    }

    /// Mutation class of a registered tool.
    pub fn mutation_class(&self, name: &str) -> Option<MutationClass> {
        if self.read.contains_key(name) {
            Some(MutationClass::Read)
        } else if self.write.contains_key(name) {
            Some(MutationClass::Write)
        } else {
            None
        }
    }

    /// Schemas in registration order; write tools only when `include_write`.
    pub fn all_tools(&self, include_write: bool) -> Vec<&ToolSchema> {
        self.entries(include_write).map(|e| e.schema()).collect()
    }

    /// Get the advertised tools as `McpTool` instances for `list_tools`.
    pub fn to_mcp_tools(&self, include_write: bool) -> Vec<McpTool> {
        self.entries(include_write).map(|e| e.to_mcp_tool()).collect()
    }

    fn entries(&self, include_write: bool) -> impl Iterator<Item = &Arc<ToolEntry>> + '_ {
        self.order.iter().filter_map(move |name| match self.read.get(name) {
            Some(entry) => Some(entry),
            None if include_write => self.write.get(name),
            None => None,
        })
    }

    /// List all registered tool names in registration order.
    pub fn list_names(&self) -> Vec<ToolName> {
        self.order.clone()
    }

    /// Check if a tool with the given name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.read.contains_key(name) || self.write.contains_key(name)
    }

    /// Return the number of registered tools.
    pub fn len(&self) -> usize {
        self.read.len() + self.write.len()
    }

    /// Return `true` if no tools are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("read", &self.read.len())
            .field("write", &self.write.len())
            .finish()
    }
}
