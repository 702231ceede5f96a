//! Request bodies and list parameters for the Gitea API.

use serde::Serialize;

use super::transport::ApiRequest;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 100;

/// Pagination, sent as `page` and `limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    pub page: i64,
    pub page_size: i64,
}

impl ListOptions {
    /// Values below 1 fall back to the defaults.
    pub fn new(page: i64, page_size: i64) -> Self {
        Self {
            page: if page < 1 { DEFAULT_PAGE } else { page },
            page_size: if page_size < 1 { DEFAULT_PAGE_SIZE } else { page_size },
        }
    }

    pub(crate) fn apply(&self, request: ApiRequest) -> ApiRequest {
        request
            .query("page", self.page)
            .query("limit", self.page_size)
    }
}

impl Default for ListOptions {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE, DEFAULT_PAGE_SIZE)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateLabelOption {
    pub name: String,
    pub color: String,
    pub description: String,
}

/// Only fields that are `Some` are sent, so omitted fields keep their value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EditLabelOption {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssueLabelsOption {
    pub labels: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatePullRequestOption {
    pub head: String,
    pub base: String,
    pub title: String,
    pub body: String,
}

/// Filters for listing pull requests.
#[derive(Debug, Clone, PartialEq)]
pub struct ListPullRequestsOptions {
    pub state: String,
    pub sort: String,
    pub milestone: Option<i64>,
    pub list: ListOptions,
}

impl ListPullRequestsOptions {
    pub(crate) fn apply(&self, request: ApiRequest) -> ApiRequest {
        let mut request = request
            .query("state", &self.state)
            .query("sort", &self.sort);
        if let Some(milestone) = self.milestone {
            request = request.query("milestone", milestone);
        }
        self.list.apply(request)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateBranchOption {
    pub new_branch_name: String,
    pub old_branch_name: String,
}

/// `content` must already be base64-encoded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateFileOptions {
    pub content: String,
    pub message: String,
    pub branch: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_branch: Option<String>,
}

/// `content` must already be base64-encoded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateFileOptions {
    pub sha: String,
    pub content: String,
    pub message: String,
    pub branch: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeleteFileOptions {
    pub message: String,
    pub branch: String,
    pub sha: String,
}
