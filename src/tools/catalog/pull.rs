//! Pull request tools.

use anyhow::{Context, Result};
use serde_json::Value;

use super::{list_options, owner, page, page_size, repo};
use crate::gitea::{CreatePullRequestOption, GiteaClient, ListPullRequestsOptions};
use crate::tools::{ParameterSpec, ToolArgs, ToolEntry, ToolSchema};

const STATES: [&str; 3] = ["open", "closed", "all"];
const SORTS: [&str; 6] = [
    "oldest",
    "recentupdate",
    "leastupdate",
    "mostcomment",
    "leastcomment",
    "priority",
];

pub(super) fn tools() -> Vec<ToolEntry> {
    vec![
        ToolEntry::read(
            ToolSchema::new("get_pull_request_by_index", "get pull request by index").params([
                owner(),
                repo(),
                ParameterSpec::integer("index")
                    .required()
                    .describe("repository pull request index"),
            ]),
            get_pull_request_by_index,
        ),
        ToolEntry::read(
            ToolSchema::new("list_repo_pull_requests", "List repository pull requests").params([
                owner(),
                repo(),
                ParameterSpec::string("state")
                    .describe("state")
                    .one_of(STATES)
                    .default_string("all"),
                ParameterSpec::string("sort")
                    .describe("sort")
                    .one_of(SORTS)
                    .default_string("recentupdate"),
                ParameterSpec::integer("milestone").describe("milestone"),
                page(),
                page_size(),
            ]),
            list_repo_pull_requests,
        ),
        ToolEntry::write(
            ToolSchema::new("create_pull_request", "create pull request").params([
                owner(),
                repo(),
                ParameterSpec::string("title").required().describe("pull request title"),
                ParameterSpec::string("body").required().describe("pull request body"),
                ParameterSpec::string("head").required().describe("pull request head"),
                ParameterSpec::string("base").required().describe("pull request base"),
            ]),
            create_pull_request,
        ),
    ]
}

async fn get_pull_request_by_index(args: ToolArgs, client: GiteaClient) -> Result<Value> {
    let (owner, repo, index) = (args.str("owner"), args.str("repo"), args.int("index"));
    client
        .get_pull_request(owner, repo, index)
        .await
        .with_context(|| format!("get {owner}/{repo}/pulls/{index}"))
}

async fn list_repo_pull_requests(args: ToolArgs, client: GiteaClient) -> Result<Value> {
    let (owner, repo) = (args.str("owner"), args.str("repo"));
    let filters = ListPullRequestsOptions {
        state: args.str("state").to_string(),
        sort: args.str("sort").to_string(),
        milestone: args.opt_int("milestone"),
        list: list_options(&args),
    };
    client
        .list_repo_pull_requests(owner, repo, &filters)
        .await
        .with_context(|| format!("list {owner}/{repo}/pulls"))
}

async fn create_pull_request(args: ToolArgs, client: GiteaClient) -> Result<Value> {
    let (owner, repo) = (args.str("owner"), args.str("repo"));
    let option = CreatePullRequestOption {
        head: args.str("head").to_string(),
        base: args.str("base").to_string(),
        title: args.str("title").to_string(),
        body: args.str("body").to_string(),
    };
    client
        .create_pull_request(owner, repo, &option)
        .await
        .with_context(|| format!("create pull request in {owner}/{repo}"))
}
