//! End-to-end tests: the real catalog, the dispatcher, and a recording transport.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Method;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

use super::catalog::default_registry;
use super::{AccessMode, ArgumentMap, Dispatcher, ToolContext, ToolEnvelope, ToolError};
use crate::gitea::GiteaClient;
use crate::gitea::testing::RecordingTransport;
use crate::types::AccessToken;

struct Harness {
    transport: Arc<RecordingTransport>,
    dispatcher: Dispatcher,
    ctx: ToolContext,
}

fn harness(mode: AccessMode) -> Harness {
    let transport = Arc::new(RecordingTransport::new());
    let client = GiteaClient::new(transport.clone(), Some(AccessToken::new("server-token")));
    let registry = Arc::new(default_registry().unwrap());
    Harness {
        transport,
        dispatcher: Dispatcher::new(registry, mode),
        ctx: ToolContext::new(client, CancellationToken::new()),
    }
}

fn args(value: Value) -> ArgumentMap {
    value.as_object().cloned().unwrap_or_default()
}

impl Harness {
    async fn call(&self, name: &str, value: Value) -> ToolEnvelope {
        self.dispatcher
            .invoke(name, args(value), self.ctx.clone())
            .await
    }

    async fn try_call(&self, name: &str, value: Value) -> Result<Value, ToolError> {
        self.dispatcher
            .try_invoke(name, &args(value), self.ctx.clone())
            .await
    }
}

/// A value of the right kind for every parameter of the named tool.
fn valid_args(dispatcher: &Dispatcher, name: &str) -> Value {
    let entry = dispatcher.registry().lookup(name).unwrap();
    let mut map = serde_json::Map::new();
    for spec in entry.schema().parameters() {
        let value = match spec.kind() {
            super::ParameterKind::String => match spec.allowed_values() {
                Some(allowed) => json!(allowed[0]),
                None => json!("x"),
            },
            super::ParameterKind::Number => json!(1),
            super::ParameterKind::Boolean => json!(false),
            super::ParameterKind::NumberArray => json!([1]),
            super::ParameterKind::StringArray => json!(["x"]),
        };
        map.insert(spec.name().to_string(), value);
    }
    Value::Object(map)
}

#[tokio::test]
async fn test_catalog_partition() {
    let full = harness(AccessMode::Full);
    assert_eq!(full.dispatcher.advertised_tools().len(), 22);

    let restricted = harness(AccessMode::ReadOnly);
    let names: Vec<&str> = restricted
        .dispatcher
        .advertised_tools()
        .iter()
        .map(|s| s.name().as_str())
        .collect();
    assert_eq!(
        names,
        vec![
            "list_repo_labels",
            "get_repo_label",
            "get_pull_request_by_index",
            "list_repo_pull_requests",
            "list_branches",
            "get_file_content",
            "get_dir_content",
            "get_my_user_info",
            "get_user_orgs",
        ]
    );
}

#[tokio::test]
async fn test_missing_required_parameter_never_reaches_gitea() {
    let h = harness(AccessMode::Full);
    for schema in h.dispatcher.advertised_tools() {
        let complete = valid_args(&h.dispatcher, schema.name().as_str());
        for spec in schema.parameters().iter().filter(|p| p.is_required()) {
            let mut partial = complete.clone();
            partial.as_object_mut().unwrap().remove(spec.name().as_str());

            let err = h.try_call(schema.name().as_str(), partial).await.unwrap_err();
            match err {
                ToolError::MissingParameter { name } => assert_eq!(name, *spec.name()),
                other => panic!("{}: unexpected error {other:?}", schema.name()),
            }
        }
    }
    assert!(h.transport.requests().is_empty());
}

#[tokio::test]
async fn test_every_write_tool_is_forbidden_when_read_only() {
    let full = harness(AccessMode::Full);
    let restricted = harness(AccessMode::ReadOnly);
    let read_only: Vec<String> = restricted
        .dispatcher
        .advertised_tools()
        .iter()
        .map(|s| s.name().to_string())
        .collect();

    let mut forbidden = 0;
    for schema in full.dispatcher.advertised_tools() {
        let name = schema.name().as_str();
        if read_only.iter().any(|r| r == name) {
            continue;
        }
        let err = restricted
            .try_call(name, valid_args(&full.dispatcher, name))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Forbidden(_)), "{name}");
        forbidden += 1;
    }
    assert_eq!(forbidden, 13);
    assert!(restricted.transport.requests().is_empty());
}

#[tokio::test]
async fn test_list_repo_labels_request() {
    let h = harness(AccessMode::ReadOnly);
    h.transport.respond_with(json!([{"id": 1, "name": "bug"}]));

    let envelope = h
        .call("list_repo_labels", json!({"owner": "acme", "repo": "widgets"}))
        .await;
    assert_eq!(envelope, ToolEnvelope::Success(json!([{"id": 1, "name": "bug"}])));

    let request = h.transport.last().unwrap();
    assert_eq!(request.method, Method::GET);
    assert_eq!(request.path(), "repos/acme/widgets/labels");
    assert_eq!(request.query_value("page"), Some("1"));
    assert_eq!(request.query_value("limit"), Some("100"));
    assert_eq!(request.token, Some(AccessToken::new("server-token")));
}

#[tokio::test]
async fn test_add_issue_labels_rejects_bad_element() {
    let h = harness(AccessMode::Full);
    let err = h
        .try_call(
            "add_issue_labels",
            json!({"owner": "a", "repo": "b", "index": 3, "labels": [1, "x", 3]}),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::InvalidArrayElement { index: 1, .. }));
    assert_eq!(err.to_string(), "labels[1] must be a non-negative integer");
    assert!(h.transport.requests().is_empty());
}

#[tokio::test]
async fn test_replace_issue_labels_sends_ids() {
    let h = harness(AccessMode::Full);
    h.call(
        "replace_issue_labels",
        json!({"owner": "a", "repo": "b", "index": 3, "labels": [4, 5]}),
    )
    .await;
    let request = h.transport.last().unwrap();
    assert_eq!(request.method, Method::PUT);
    assert_eq!(request.path(), "repos/a/b/issues/3/labels");
    assert_eq!(request.body, Some(json!({"labels": [4, 5]})));
}

#[tokio::test]
async fn test_edit_repo_label_sends_only_supplied_fields() {
    let h = harness(AccessMode::Full);
    h.call(
        "edit_repo_label",
        json!({"owner": "a", "repo": "b", "id": 9, "description": ""}),
    )
    .await;
    let request = h.transport.last().unwrap();
    assert_eq!(request.method, Method::PATCH);
    assert_eq!(request.path(), "repos/a/b/labels/9");
    assert_eq!(request.body, Some(json!({"description": ""})));
}

#[tokio::test]
async fn test_confirmation_messages() {
    let h = harness(AccessMode::Full);
    let cases = [
        ("delete_repo_label", json!({"owner": "a", "repo": "b", "id": 1}), "Label deleted successfully"),
        ("clear_issue_labels", json!({"owner": "a", "repo": "b", "index": 1}), "Labels cleared successfully"),
        (
            "remove_issue_label",
            json!({"owner": "a", "repo": "b", "index": 1, "label_id": 2}),
            "Label removed successfully",
        ),
        (
            "create_branch",
            json!({"owner": "a", "repo": "b", "branch": "feat", "old_branch": "main"}),
            "Branch Created",
        ),
        ("delete_branch", json!({"owner": "a", "repo": "b", "branch": "feat"}), "Branch Deleted"),
    ];
    for (name, value, expected) in cases {
        let envelope = h.call(name, value).await;
        assert_eq!(envelope.text(), expected, "{name}");
        assert!(!envelope.is_error());
    }
}

#[tokio::test]
async fn test_list_repo_pull_requests_filters() {
    let h = harness(AccessMode::Full);
    h.call(
        "list_repo_pull_requests",
        json!({"owner": "a", "repo": "b", "state": "open", "milestone": 2, "page": 3}),
    )
    .await;
    let request = h.transport.last().unwrap();
    assert_eq!(request.path(), "repos/a/b/pulls");
    assert_eq!(request.query_value("state"), Some("open"));
    assert_eq!(request.query_value("sort"), Some("recentupdate"));
    assert_eq!(request.query_value("milestone"), Some("2"));
    assert_eq!(request.query_value("page"), Some("3"));

    let err = h
        .try_call("list_repo_pull_requests", json!({"owner": "a", "repo": "b", "state": "merged"}))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "state must be one of: open, closed, all");

    let err = h
        .try_call("list_repo_pull_requests", json!({"owner": "a", "repo": "b", "sort": "newest"}))
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::InvalidParameterValue { .. }), "{err:?}");
    assert!(err.to_string().starts_with("sort must be one of: oldest, recentupdate"), "{err}");
    assert_eq!(h.transport.requests().len(), 1);
}

#[tokio::test]
async fn test_list_branches_uses_first_page() {
    let h = harness(AccessMode::ReadOnly);
    h.call("list_branches", json!({"owner": "a", "repo": "b"})).await;
    let request = h.transport.last().unwrap();
    assert_eq!(request.path(), "repos/a/b/branches");
    assert_eq!(request.query_value("page"), Some("1"));
    assert_eq!(request.query_value("limit"), Some("100"));
}

#[tokio::test]
async fn test_get_file_content_with_lines() {
    let h = harness(AccessMode::ReadOnly);
    h.transport.respond_with(json!({
        "name": "main.rs",
        "path": "src/main.rs",
        "sha": "abc",
        "content": STANDARD.encode("fn main() {\n}\n"),
    }));

    let envelope = h
        .call(
            "get_file_content",
            json!({"owner": "a", "repo": "b", "ref": "main", "filePath": "src/main.rs", "withLines": true}),
        )
        .await;
    let ToolEnvelope::Success(payload) = envelope else {
        panic!("expected success");
    };
    assert_eq!(payload["sha"], "abc");
    assert_eq!(
        payload["content"],
        json!([{"line": 1, "content": "fn main() {"}, {"line": 2, "content": "}"}])
    );

    let request = h.transport.last().unwrap();
    assert_eq!(request.path(), "repos/a/b/contents/src/main.rs");
    assert_eq!(request.query_value("ref"), Some("main"));
}

#[tokio::test]
async fn test_get_file_content_without_lines_is_untouched() {
    let h = harness(AccessMode::ReadOnly);
    let raw = json!({"name": "a.txt", "content": "YQ=="});
    h.transport.respond_with(raw.clone());
    let envelope = h
        .call(
            "get_file_content",
            json!({"owner": "a", "repo": "b", "ref": "main", "filePath": "a.txt"}),
        )
        .await;
    assert_eq!(envelope, ToolEnvelope::Success(raw));
}

#[tokio::test]
async fn test_create_file_encodes_content() {
    let h = harness(AccessMode::Full);
    let envelope = h
        .call(
            "create_file",
            json!({
                "owner": "a", "repo": "b", "filePath": "docs/new.md",
                "content": "hello", "message": "add", "branch_name": "main",
            }),
        )
        .await;
    assert_eq!(envelope.text(), "Create file success");

    let request = h.transport.last().unwrap();
    assert_eq!(request.method, Method::POST);
    assert_eq!(request.path(), "repos/a/b/contents/docs/new.md");
    assert_eq!(
        request.body,
        Some(json!({"content": "aGVsbG8=", "message": "add", "branch": "main"}))
    );
}

#[tokio::test]
async fn test_delete_file_sends_sha() {
    let h = harness(AccessMode::Full);
    h.call(
        "delete_file",
        json!({"owner": "a", "repo": "b", "filePath": "x", "message": "rm", "branch_name": "main", "sha": "s1"}),
    )
    .await;
    let request = h.transport.last().unwrap();
    assert_eq!(request.method, Method::DELETE);
    assert_eq!(
        request.body,
        Some(json!({"message": "rm", "branch": "main", "sha": "s1"}))
    );
}

#[tokio::test]
async fn test_delete_file_without_sha_fails_locally() {
    let h = harness(AccessMode::Full);
    let envelope = h
        .call(
            "delete_file",
            json!({"owner": "a", "repo": "b", "filePath": "x", "message": "rm", "branch_name": "main"}),
        )
        .await;
    assert!(envelope.is_error());
    assert!(envelope.text().contains("sha is required"), "{}", envelope.text());
    assert!(h.transport.requests().is_empty());
}

#[tokio::test]
async fn test_user_tools() {
    let h = harness(AccessMode::ReadOnly);
    h.call("get_my_user_info", json!({})).await;
    assert_eq!(h.transport.last().unwrap().path(), "user");

    h.call("get_user_orgs", json!({"pageSize": 10})).await;
    let request = h.transport.last().unwrap();
    assert_eq!(request.path(), "user/orgs");
    assert_eq!(request.query_value("limit"), Some("10"));
}

#[tokio::test]
async fn test_service_failure_carries_context() {
    let h = harness(AccessMode::ReadOnly);
    h.transport
        .fail_next("Gitea API returned 404 Not Found: The target couldn't be found.");
    let envelope = h
        .call("list_repo_labels", json!({"owner": "acme", "repo": "widgets"}))
        .await;
    assert_eq!(
        envelope,
        ToolEnvelope::Failure(
            "list acme/widgets/labels: Gitea API returned 404 Not Found: The target couldn't be found."
                .to_string()
        )
    );
}

#[tokio::test]
async fn test_per_request_token_is_forwarded() {
    let h = harness(AccessMode::ReadOnly);
    let ctx = ToolContext::new(
        h.ctx.client.with_token(Some(AccessToken::new("caller-token"))),
        CancellationToken::new(),
    );
    h.dispatcher
        .invoke("get_my_user_info", ArgumentMap::new(), ctx)
        .await;
    assert_eq!(
        h.transport.last().unwrap().token,
        Some(AccessToken::new("caller-token"))
    );
}
