//! Repository and issue label tools.

use anyhow::{Context, Result};
use serde_json::{Value, json};

use super::{list_options, owner, page, page_size, repo};
use crate::gitea::{CreateLabelOption, EditLabelOption, GiteaClient, IssueLabelsOption};
use crate::tools::{ParameterSpec, ToolArgs, ToolEntry, ToolSchema};

pub(super) fn tools() -> Vec<ToolEntry> {
    vec![
        ToolEntry::read(
            ToolSchema::new("list_repo_labels", "Lists all labels for a given repository")
                .params([owner(), repo(), page(), page_size()]),
            list_repo_labels,
        ),
        ToolEntry::read(
            ToolSchema::new("get_repo_label", "Gets a single label by its ID for a repository")
                .params([owner(), repo(), label_id("id")]),
            get_repo_label,
        ),
        ToolEntry::write(
            ToolSchema::new("create_repo_label", "Creates a new label for a repository").params([
                owner(),
                repo(),
                ParameterSpec::string("name").required().describe("label name"),
                ParameterSpec::string("color")
                    .required()
                    .describe("label color (hex code, e.g., #RRGGBB)"),
                ParameterSpec::string("description").describe("label description"),
            ]),
            create_repo_label,
        ),
        ToolEntry::write(
            ToolSchema::new("edit_repo_label", "Edits an existing label in a repository").params([
                owner(),
                repo(),
                label_id("id"),
                ParameterSpec::string("name").describe("new label name"),
                ParameterSpec::string("color").describe("new label color (hex code, e.g., #RRGGBB)"),
                ParameterSpec::string("description").describe("new label description"),
            ]),
            edit_repo_label,
        ),
        ToolEntry::write(
            ToolSchema::new("delete_repo_label", "Deletes a label from a repository")
                .params([owner(), repo(), label_id("id")]),
            delete_repo_label,
        ),
        ToolEntry::write(
            ToolSchema::new("add_issue_labels", "Adds one or more labels to an issue").params([
                owner(),
                repo(),
                issue_index(),
                ParameterSpec::integer_array("labels")
                    .required()
                    .describe("array of label IDs to add"),
            ]),
            add_issue_labels,
        ),
        ToolEntry::write(
            ToolSchema::new("replace_issue_labels", "Replaces all labels on an issue").params([
                owner(),
                repo(),
                issue_index(),
                ParameterSpec::integer_array("labels")
                    .required()
                    .describe("array of label IDs to replace with"),
            ]),
            replace_issue_labels,
        ),
        ToolEntry::write(
            ToolSchema::new("clear_issue_labels", "Removes all labels from an issue")
                .params([owner(), repo(), issue_index()]),
            clear_issue_labels,
        ),
        ToolEntry::write(
            ToolSchema::new("remove_issue_label", "Removes a single label from an issue").params([
                owner(),
                repo(),
                issue_index(),
                ParameterSpec::integer("label_id")
                    .required()
                    .describe("label ID to remove"),
            ]),
            remove_issue_label,
        ),
    ]
}

fn label_id(name: &str) -> ParameterSpec {
    ParameterSpec::integer(name).required().describe("label ID")
}

fn issue_index() -> ParameterSpec {
    ParameterSpec::integer("index").required().describe("issue index")
}

async fn list_repo_labels(args: ToolArgs, client: GiteaClient) -> Result<Value> {
    let (owner, repo) = (args.str("owner"), args.str("repo"));
    client
        .list_repo_labels(owner, repo, list_options(&args))
        .await
        .with_context(|| format!("list {owner}/{repo}/labels"))
}

async fn get_repo_label(args: ToolArgs, client: GiteaClient) -> Result<Value> {
    let (owner, repo, id) = (args.str("owner"), args.str("repo"), args.int("id"));
    client
        .get_repo_label(owner, repo, id)
        .await
        .with_context(|| format!("get {owner}/{repo}/labels/{id}"))
}

async fn create_repo_label(args: ToolArgs, client: GiteaClient) -> Result<Value> {
    let (owner, repo) = (args.str("owner"), args.str("repo"));
    let option = CreateLabelOption {
        name: args.str("name").to_string(),
        color: args.str("color").to_string(),
        description: args.str("description").to_string(),
    };
    client
        .create_label(owner, repo, &option)
        .await
        .with_context(|| format!("create label in {owner}/{repo}"))
}

async fn edit_repo_label(args: ToolArgs, client: GiteaClient) -> Result<Value> {
    let (owner, repo, id) = (args.str("owner"), args.str("repo"), args.int("id"));
    let option = EditLabelOption {
        name: args.opt_str("name").map(str::to_string),
        color: args.opt_str("color").map(str::to_string),
        description: args.opt_str("description").map(str::to_string),
    };
    client
        .edit_label(owner, repo, id, &option)
        .await
        .with_context(|| format!("edit {owner}/{repo}/labels/{id}"))
}

async fn delete_repo_label(args: ToolArgs, client: GiteaClient) -> Result<Value> {
    let (owner, repo, id) = (args.str("owner"), args.str("repo"), args.int("id"));
    client
        .delete_label(owner, repo, id)
        .await
        .with_context(|| format!("delete {owner}/{repo}/labels/{id}"))?;
    Ok(json!("Label deleted successfully"))
}

async fn add_issue_labels(args: ToolArgs, client: GiteaClient) -> Result<Value> {
    let (owner, repo, index) = (args.str("owner"), args.str("repo"), args.int("index"));
    let option = IssueLabelsOption {
        labels: args.ints("labels"),
    };
    client
        .add_issue_labels(owner, repo, index, &option)
        .await
        .with_context(|| format!("add labels to {owner}/{repo}#{index}"))
}

async fn replace_issue_labels(args: ToolArgs, client: GiteaClient) -> Result<Value> {
    let (owner, repo, index) = (args.str("owner"), args.str("repo"), args.int("index"));
    let option = IssueLabelsOption {
        labels: args.ints("labels"),
    };
    client
        .replace_issue_labels(owner, repo, index, &option)
        .await
        .with_context(|| format!("replace labels on {owner}/{repo}#{index}"))
}

async fn clear_issue_labels(args: ToolArgs, client: GiteaClient) -> Result<Value> {
    let (owner, repo, index) = (args.str("owner"), args.str("repo"), args.int("index"));
    client
        .clear_issue_labels(owner, repo, index)
        .await
        .with_context(|| format!("clear labels on {owner}/{repo}#{index}"))?;
    Ok(json!("Labels cleared successfully"))
}

async fn remove_issue_label(args: ToolArgs, client: GiteaClient) -> Result<Value> {
    let (owner, repo, index) = (args.str("owner"), args.str("repo"), args.int("index"));
    let label = args.int("label_id");
    client
        .delete_issue_label(owner, repo, index, label)
        .await
        .with_context(|| format!("remove label {label} from {owner}/{repo}#{index}"))?;
    Ok(json!("Label removed successfully"))
}
