//! Repository content tools.

use anyhow::{Context, Result, anyhow};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use serde_json::{Value, json};

use super::{owner, repo};
use crate::gitea::{CreateFileOptions, DeleteFileOptions, GiteaClient, UpdateFileOptions};
use crate::tools::{ParameterSpec, ToolArgs, ToolEntry, ToolSchema};

pub(super) fn tools() -> Vec<ToolEntry> {
    vec![
        ToolEntry::read(
            ToolSchema::new("get_file_content", "Get file Content and Metadata").params([
                owner(),
                repo(),
                git_ref(),
                ParameterSpec::string("filePath").required().describe("file path"),
                ParameterSpec::boolean("withLines")
                    .describe("whether to return file content with lines"),
            ]),
            get_file_content,
        ),
        ToolEntry::read(
            ToolSchema::new("get_dir_content", "Get a list of entries in a directory").params([
                owner(),
                repo(),
                git_ref(),
                ParameterSpec::string("filePath")
                    .required()
                    .describe("directory path"),
            ]),
            get_dir_content,
        ),
        ToolEntry::write(
            ToolSchema::new("create_file", "Create file").params([
                owner(),
                repo(),
                file_path(),
                ParameterSpec::string("content").required().describe("file content"),
                commit_message(),
                branch_name(),
                ParameterSpec::string("new_branch_name").describe("new branch name"),
            ]),
            create_file,
        ),
        ToolEntry::write(
            ToolSchema::new("update_file", "Update file").params([
                owner(),
                repo(),
                file_path(),
                ParameterSpec::string("sha")
                    .required()
                    .describe("sha is the SHA for the file that already exists"),
                ParameterSpec::string("content").required().describe("file content"),
                commit_message(),
                branch_name(),
            ]),
            update_file,
        ),
        ToolEntry::write(
            ToolSchema::new("delete_file", "Delete file").params([
                owner(),
                repo(),
                file_path(),
                commit_message(),
                branch_name(),
                ParameterSpec::string("sha").describe("sha"),
            ]),
            delete_file,
        ),
    ]
}

fn git_ref() -> ParameterSpec {
    ParameterSpec::string("ref")
        .required()
        .describe("ref can be branch/tag/commit")
}

fn file_path() -> ParameterSpec {
    ParameterSpec::string("filePath").required().describe("file path")
}

fn commit_message() -> ParameterSpec {
    ParameterSpec::string("message").required().describe("commit message")
}

fn branch_name() -> ParameterSpec {
    ParameterSpec::string("branch_name").required().describe("branch name")
}

/// One numbered line of a decoded file.
#[derive(Debug, Clone, PartialEq, Serialize)]
struct ContentLine {
    line: usize,
    content: String,
}

async fn get_file_content(args: ToolArgs, client: GiteaClient) -> Result<Value> {
    let (owner, repo) = (args.str("owner"), args.str("repo"));
    let (git_ref, path) = (args.str("ref"), args.str("filePath"));
    let mut file = client
        .get_contents(owner, repo, git_ref, path)
        .await
        .with_context(|| format!("get {owner}/{repo}/contents/{path}"))?;

    if args.bool("withLines") {
        let lines = match file.get("content").and_then(Value::as_str) {
            Some(encoded) => numbered_lines(encoded).with_context(|| format!("read {path}"))?,
            None => return Err(anyhow!("{path} has no inline content")),
        };
        if let Some(object) = file.as_object_mut() {
            object.insert("content".to_string(), serde_json::to_value(lines)?);
        }
    }
    Ok(file)
}

/// Decode base64 file content into numbered lines. A trailing empty line
/// (the file's final newline) is dropped.
fn numbered_lines(encoded: &str) -> Result<Vec<ContentLine>> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let raw = STANDARD
        .decode(compact)
        .context("decode base64 content")?;
    let text = String::from_utf8_lossy(&raw);

    let mut lines: Vec<ContentLine> = text
        .lines()
        .enumerate()
        .map(|(i, content)| ContentLine {
            line: i + 1,
            content: content.to_string(),
        })
        .collect();
    if lines.last().is_some_and(|l| l.content.is_empty()) {
        lines.pop();
    }
    Ok(lines)
}

async fn get_dir_content(args: ToolArgs, client: GiteaClient) -> Result<Value> {
    let (owner, repo) = (args.str("owner"), args.str("repo"));
    let (git_ref, path) = (args.str("ref"), args.str("filePath"));
    client
        .list_contents(owner, repo, git_ref, path)
        .await
        .with_context(|| format!("list {owner}/{repo}/contents/{path}"))
}

async fn create_file(args: ToolArgs, client: GiteaClient) -> Result<Value> {
    let (owner, repo, path) = (args.str("owner"), args.str("repo"), args.str("filePath"));
    let option = CreateFileOptions {
        content: STANDARD.encode(args.str("content")),
        message: args.str("message").to_string(),
        branch: args.str("branch_name").to_string(),
        new_branch: args
            .opt_str("new_branch_name")
            .filter(|b| !b.is_empty())
            .map(str::to_string),
    };
    client
        .create_file(owner, repo, path, &option)
        .await
        .with_context(|| format!("create {owner}/{repo}/contents/{path}"))?;
    Ok(json!("Create file success"))
}

async fn update_file(args: ToolArgs, client: GiteaClient) -> Result<Value> {
    let (owner, repo, path) = (args.str("owner"), args.str("repo"), args.str("filePath"));
    let option = UpdateFileOptions {
        sha: args.str("sha").to_string(),
        content: STANDARD.encode(args.str("content")),
        message: args.str("message").to_string(),
        branch: args.str("branch_name").to_string(),
    };
    client
        .update_file(owner, repo, path, &option)
        .await
        .with_context(|| format!("update {owner}/{repo}/contents/{path}"))?;
    Ok(json!("Update file success"))
}

async fn delete_file(args: ToolArgs, client: GiteaClient) -> Result<Value> {
    let (owner, repo, path) = (args.str("owner"), args.str("repo"), args.str("filePath"));
    // Gitea refuses a delete without the blob sha.
    let sha = args
        .opt_str("sha")
        .ok_or_else(|| anyhow!("sha is required"))?;
    let option = DeleteFileOptions {
        message: args.str("message").to_string(),
        branch: args.str("branch_name").to_string(),
        sha: sha.to_string(),
    };
    client
        .delete_file(owner, repo, path, &option)
        .await
        .with_context(|| format!("delete {owner}/{repo}/contents/{path}"))?;
    Ok(json!("Delete file success"))
}
