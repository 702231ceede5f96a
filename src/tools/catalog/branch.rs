//! Branch tools.

use anyhow::{Context, Result};
use serde_json::{Value, json};

use super::{owner, repo};
use crate::gitea::{CreateBranchOption, GiteaClient, ListOptions};
use crate::tools::{ParameterSpec, ToolArgs, ToolEntry, ToolSchema};

pub(super) fn tools() -> Vec<ToolEntry> {
    vec![
        ToolEntry::write(
            ToolSchema::new("create_branch", "Create branch").params([
                owner(),
                repo(),
                ParameterSpec::string("branch")
                    .required()
                    .describe("Name of the branch to create"),
                ParameterSpec::string("old_branch")
                    .required()
                    .describe("Name of the old branch to create from"),
            ]),
            create_branch,
        ),
        ToolEntry::write(
            ToolSchema::new("delete_branch", "Delete branch").params([
                owner(),
                repo(),
                ParameterSpec::string("branch")
                    .required()
                    .describe("Name of the branch to delete"),
            ]),
            delete_branch,
        ),
        ToolEntry::read(
            ToolSchema::new("list_branches", "List branches").params([owner(), repo()]),
            list_branches,
        ),
    ]
}

async fn create_branch(args: ToolArgs, client: GiteaClient) -> Result<Value> {
    let (owner, repo) = (args.str("owner"), args.str("repo"));
    let option = CreateBranchOption {
        new_branch_name: args.str("branch").to_string(),
        old_branch_name: args.str("old_branch").to_string(),
    };
    client
        .create_branch(owner, repo, &option)
        .await
        .with_context(|| format!("create branch {} in {owner}/{repo}", option.new_branch_name))?;
    Ok(json!("Branch Created"))
}

async fn delete_branch(args: ToolArgs, client: GiteaClient) -> Result<Value> {
    let (owner, repo, branch) = (args.str("owner"), args.str("repo"), args.str("branch"));
    client
        .delete_repo_branch(owner, repo, branch)
        .await
        .with_context(|| format!("delete branch {branch} in {owner}/{repo}"))?;
    Ok(json!("Branch Deleted"))
}

/// Only the first page; the tool takes no pagination arguments.
async fn list_branches(args: ToolArgs, client: GiteaClient) -> Result<Value> {
    let (owner, repo) = (args.str("owner"), args.str("repo"));
    client
        .list_repo_branches(owner, repo, ListOptions::default())
        .await
        .with_context(|| format!("list {owner}/{repo}/branches"))
}
