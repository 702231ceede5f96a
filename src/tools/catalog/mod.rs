//! The concrete Gitea tool families.
//!
//! Each family exposes a `tools()` table; [`default_registry`] registers all
//! of them in a fixed order.

mod branch;
mod file;
mod label;
mod pull;
mod user;

use super::coerce::ToolArgs;
use super::error::RegistryError;
use super::registry::{ToolEntry, ToolRegistry};
use super::schema::ParameterSpec;
use crate::gitea::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE, ListOptions};

/// Every tool family, in registration order.
pub fn all_tools() -> Vec<ToolEntry> {
    [
        label::tools(),
        pull::tools(),
        branch::tools(),
        file::tools(),
        user::tools(),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Registry holding the full catalog.
pub fn default_registry() -> Result<ToolRegistry, RegistryError> {
    ToolRegistry::new().with_tools(all_tools())
}

fn owner() -> ParameterSpec {
    ParameterSpec::string("owner")
        .required()
        .describe("repository owner")
}

fn repo() -> ParameterSpec {
    ParameterSpec::string("repo")
        .required()
        .describe("repository name")
}

fn page() -> ParameterSpec {
    ParameterSpec::integer("page")
        .describe("page number")
        .default_number(DEFAULT_PAGE as f64)
}

fn page_size() -> ParameterSpec {
    ParameterSpec::integer("pageSize")
        .describe("page size")
        .default_number(DEFAULT_PAGE_SIZE as f64)
}

fn list_options(args: &ToolArgs) -> ListOptions {
    ListOptions::new(args.int("page"), args.int("pageSize"))
}
