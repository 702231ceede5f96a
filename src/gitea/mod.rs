//! Typed client for the subset of the Gitea REST API the tools use.
//!
//! Every operation returns the response body as `serde_json::Value`; tool
//! handlers forward it unchanged.

mod options;
mod transport;

#[cfg(test)]
pub mod testing;

use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;
use serde_json::Value;

use crate::config::ServerConfig;
use crate::types::AccessToken;

pub use options::{
    CreateBranchOption, CreateFileOptions, CreateLabelOption, CreatePullRequestOption,
    DEFAULT_PAGE, DEFAULT_PAGE_SIZE, DeleteFileOptions, EditLabelOption, IssueLabelsOption,
    ListOptions, ListPullRequestsOptions, UpdateFileOptions,
};
pub use transport::{ApiRequest, GiteaTransport, HttpTransport, build_url};

/// Cheap to clone; clones share the transport's connection pool.
#[derive(Clone)]
pub struct GiteaClient {
    transport: Arc<dyn GiteaTransport>,
    token: Option<AccessToken>,
}

impl GiteaClient {
    pub fn new(transport: Arc<dyn GiteaTransport>, token: Option<AccessToken>) -> Self {
        Self { transport, token }
    }

    pub fn from_config(config: &ServerConfig) -> Result<Self> {
        let transport = HttpTransport::from_config(config)?;
        Ok(Self::new(Arc::new(transport), config.token.clone()))
    }

    /// Same transport, different credentials. `None` keeps the current token.
    pub fn with_token(&self, token: Option<AccessToken>) -> Self {
        Self {
            transport: self.transport.clone(),
            token: token.or_else(|| self.token.clone()),
        }
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    async fn send(&self, request: ApiRequest) -> Result<Value> {
        self.transport.send(request.token(self.token.clone())).await
    }

    async fn send_json<T: Serialize>(&self, request: ApiRequest, body: &T) -> Result<Value> {
        let body = serde_json::to_value(body)?;
        self.send(request.json(body)).await
    }

    // Labels

    pub async fn list_repo_labels(&self, owner: &str, repo: &str, list: ListOptions) -> Result<Value> {
        let request = ApiRequest::get(repo_path(owner, repo, &["labels"]));
        self.send(list.apply(request)).await
    }

    pub async fn get_repo_label(&self, owner: &str, repo: &str, id: i64) -> Result<Value> {
        let id = id.to_string();
        self.send(ApiRequest::get(repo_path(owner, repo, &["labels", &id])))
            .await
    }

    pub async fn create_label(&self, owner: &str, repo: &str, option: &CreateLabelOption) -> Result<Value> {
        let request = ApiRequest::post(repo_path(owner, repo, &["labels"]));
        self.send_json(request, option).await
    }

    pub async fn edit_label(
        &self,
        owner: &str,
        repo: &str,
        id: i64,
        option: &EditLabelOption,
    ) -> Result<Value> {
        let id = id.to_string();
        let request = ApiRequest::patch(repo_path(owner, repo, &["labels", &id]));
        self.send_json(request, option).await
    }

    pub async fn delete_label(&self, owner: &str, repo: &str, id: i64) -> Result<Value> {
        let id = id.to_string();
        self.send(ApiRequest::delete(repo_path(owner, repo, &["labels", &id])))
            .await
    }

    pub async fn add_issue_labels(
        &self,
        owner: &str,
        repo: &str,
        index: i64,
        option: &IssueLabelsOption,
    ) -> Result<Value> {
        let index = index.to_string();
        let request = ApiRequest::post(repo_path(owner, repo, &["issues", &index, "labels"]));
        self.send_json(request, option).await
    }

    pub async fn replace_issue_labels(
        &self,
        owner: &str,
        repo: &str,
        index: i64,
        option: &IssueLabelsOption,
    ) -> Result<Value> {
        let index = index.to_string();
        let request = ApiRequest::put(repo_path(owner, repo, &["issues", &index, "labels"]));
        self.send_json(request, option).await
    }

    pub async fn clear_issue_labels(&self, owner: &str, repo: &str, index: i64) -> Result<Value> {
        let index = index.to_string();
        self.send(ApiRequest::delete(repo_path(owner, repo, &["issues", &index, "labels"])))
            .await
    }

    pub async fn delete_issue_label(&self, owner: &str, repo: &str, index: i64, label: i64) -> Result<Value> {
        let index = index.to_string();
        let label = label.to_string();
        self.send(ApiRequest::delete(repo_path(
            owner,
            repo,
            &["issues", &index, "labels", &label],
        )))
        .await
    }

    // Pull requests

    pub async fn get_pull_request(&self, owner: &str, repo: &str, index: i64) -> Result<Value> {
        let index = index.to_string();
        self.send(ApiRequest::get(repo_path(owner, repo, &["pulls", &index])))
            .await
    }

    pub async fn list_repo_pull_requests(
        &self,
        owner: &str,
        repo: &str,
        filters: &ListPullRequestsOptions,
    ) -> Result<Value> {
        let request = ApiRequest::get(repo_path(owner, repo, &["pulls"]));
        self.send(filters.apply(request)).await
    }

    pub async fn create_pull_request(
        &self,
        owner: &str,
        repo: &str,
        option: &CreatePullRequestOption,
    ) -> Result<Value> {
        let request = ApiRequest::post(repo_path(owner, repo, &["pulls"]));
        self.send_json(request, option).await
    }

    // Branches

    pub async fn create_branch(&self, owner: &str, repo: &str, option: &CreateBranchOption) -> Result<Value> {
        let request = ApiRequest::post(repo_path(owner, repo, &["branches"]));
        self.send_json(request, option).await
    }

    pub async fn delete_repo_branch(&self, owner: &str, repo: &str, branch: &str) -> Result<Value> {
        self.send(ApiRequest::delete(repo_path(owner, repo, &["branches", branch])))
            .await
    }

    pub async fn list_repo_branches(&self, owner: &str, repo: &str, list: ListOptions) -> Result<Value> {
        let request = ApiRequest::get(repo_path(owner, repo, &["branches"]));
        self.send(list.apply(request)).await
    }

    // Contents

    /// Metadata and base64 content of a single file.
    pub async fn get_contents(&self, owner: &str, repo: &str, git_ref: &str, path: &str) -> Result<Value> {
        self.send(contents_request(owner, repo, git_ref, path)).await
    }

    /// Entries of a directory.
    pub async fn list_contents(&self, owner: &str, repo: &str, git_ref: &str, path: &str) -> Result<Value> {
        self.send(contents_request(owner, repo, git_ref, path)).await
    }

    pub async fn create_file(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        option: &CreateFileOptions,
    ) -> Result<Value> {
        let request = ApiRequest::post(file_path(owner, repo, path));
        self.send_json(request, option).await
    }

    pub async fn update_file(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        option: &UpdateFileOptions,
    ) -> Result<Value> {
        let request = ApiRequest::put(file_path(owner, repo, path));
        self.send_json(request, option).await
    }

    pub async fn delete_file(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        option: &DeleteFileOptions,
    ) -> Result<Value> {
        let request = ApiRequest::delete(file_path(owner, repo, path));
        self.send_json(request, option).await
    }

    // User

    pub async fn get_my_user_info(&self) -> Result<Value> {
        self.send(ApiRequest::get(["user"])).await
    }

    pub async fn list_my_orgs(&self, list: ListOptions) -> Result<Value> {
        self.send(list.apply(ApiRequest::get(["user", "orgs"]))).await
    }
}

impl std::fmt::Debug for GiteaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GiteaClient")
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}

fn repo_path(owner: &str, repo: &str, rest: &[&str]) -> Vec<String> {
    ["repos", owner, repo]
        .iter()
        .chain(rest)
        .map(|s| s.to_string())
        .collect()
}

/// File paths keep their directory structure; each component is its own segment.
fn file_path(owner: &str, repo: &str, path: &str) -> Vec<String> {
    let mut segments = repo_path(owner, repo, &["contents"]);
    segments.extend(
        path.split('/')
            .filter(|part| !part.is_empty())
            .map(str::to_string),
    );
    segments
}

fn contents_request(owner: &str, repo: &str, git_ref: &str, path: &str) -> ApiRequest {
    let request = ApiRequest::get(file_path(owner, repo, path));
    if git_ref.is_empty() {
        request
    } else {
        request.query("ref", git_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingTransport;
    use super::*;
    use reqwest::Method;
    use serde_json::json;

    fn client() -> (Arc<RecordingTransport>, GiteaClient) {
        let transport = Arc::new(RecordingTransport::new());
        let client = GiteaClient::new(transport.clone(), Some(AccessToken::new("t0k")));
        (transport, client)
    }

    #[test]
    fn test_file_path_splits_components() {
        assert_eq!(
            file_path("a", "b", "/src/lib.rs"),
            vec!["repos", "a", "b", "contents", "src", "lib.rs"]
        );
    }

    #[tokio::test]
    async fn test_token_is_attached() {
        let (transport, client) = client();
        client.get_my_user_info().await.unwrap();
        let request = transport.last().unwrap();
        assert_eq!(request.path(), "user");
        assert_eq!(request.token, Some(AccessToken::new("t0k")));
    }

    #[tokio::test]
    async fn test_with_token_overrides_only_when_given() {
        let (transport, client) = client();
        client.with_token(None).get_my_user_info().await.unwrap();
        client
            .with_token(Some(AccessToken::new("caller")))
            .get_my_user_info()
            .await
            .unwrap();

        let tokens: Vec<_> = transport.requests().into_iter().map(|r| r.token).collect();
        assert_eq!(
            tokens,
            vec![Some(AccessToken::new("t0k")), Some(AccessToken::new("caller"))]
        );
    }

    #[tokio::test]
    async fn test_issue_label_endpoints() {
        let (transport, client) = client();
        let option = IssueLabelsOption { labels: vec![1, 2] };
        client.add_issue_labels("a", "b", 7, &option).await.unwrap();
        client.replace_issue_labels("a", "b", 7, &option).await.unwrap();
        client.clear_issue_labels("a", "b", 7).await.unwrap();
        client.delete_issue_label("a", "b", 7, 3).await.unwrap();

        let seen: Vec<(Method, String)> = transport
            .requests()
            .into_iter()
            .map(|r| (r.method.clone(), r.path()))
            .collect();
        assert_eq!(
            seen,
            vec![
                (Method::POST, "repos/a/b/issues/7/labels".to_string()),
                (Method::PUT, "repos/a/b/issues/7/labels".to_string()),
                (Method::DELETE, "repos/a/b/issues/7/labels".to_string()),
                (Method::DELETE, "repos/a/b/issues/7/labels/3".to_string()),
            ]
        );
        assert_eq!(transport.requests()[0].body, Some(json!({"labels": [1, 2]})));
    }

    #[tokio::test]
    async fn test_contents_ref_is_optional() {
        let (transport, client) = client();
        client.get_contents("a", "b", "", "README.md").await.unwrap();
        assert_eq!(transport.last().unwrap().query_value("ref"), None);

        client.list_contents("a", "b", "main", "docs").await.unwrap();
        let request = transport.last().unwrap();
        assert_eq!(request.path(), "repos/a/b/contents/docs");
        assert_eq!(request.query_value("ref"), Some("main"));
    }

    #[tokio::test]
    async fn test_transport_errors_propagate() {
        let (transport, client) = client();
        transport.fail_next("Gitea API returned 401 Unauthorized: token is required");
        let err = client.list_my_orgs(ListOptions::default()).await.unwrap_err();
        assert!(err.to_string().contains("401"));
    }
}
