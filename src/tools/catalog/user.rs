//! Tools about the authenticated user.

use anyhow::{Context, Result};
use serde_json::Value;

use super::{list_options, page, page_size};
use crate::gitea::GiteaClient;
use crate::tools::{ToolArgs, ToolEntry, ToolSchema};

pub(super) fn tools() -> Vec<ToolEntry> {
    vec![
        ToolEntry::read(
            ToolSchema::new("get_my_user_info", "Get my user info"),
            get_my_user_info,
        ),
        ToolEntry::read(
            ToolSchema::new(
                "get_user_orgs",
                "Get organizations associated with the authenticated user",
            )
            .params([page(), page_size()]),
            get_user_orgs,
        ),
    ]
}

async fn get_my_user_info(_args: ToolArgs, client: GiteaClient) -> Result<Value> {
    client.get_my_user_info().await.context("get user info")
}

async fn get_user_orgs(args: ToolArgs, client: GiteaClient) -> Result<Value> {
    client
        .list_my_orgs(list_options(&args))
        .await
        .context("list user organizations")
}
