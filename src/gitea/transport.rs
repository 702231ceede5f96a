//! Raw HTTP access to the Gitea REST API.

use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::config::ServerConfig;
use crate::types::AccessToken;

/// Longest slice of a non-JSON error body quoted in an error message.
const MAX_ERROR_BODY: usize = 200;

/// One call against `{host}/api/v1`.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path below the API root, one entry per segment (percent-encoded on send).
    pub segments: Vec<String>,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub token: Option<AccessToken>,
}

impl ApiRequest {
    pub fn new<I, S>(method: Method, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            method,
            segments: segments.into_iter().map(Into::into).collect(),
            query: Vec::new(),
            body: None,
            token: None,
        }
    }

    pub fn get<I: IntoIterator<Item = S>, S: Into<String>>(segments: I) -> Self {
        Self::new(Method::GET, segments)
    }

    pub fn post<I: IntoIterator<Item = S>, S: Into<String>>(segments: I) -> Self {
        Self::new(Method::POST, segments)
    }

    pub fn put<I: IntoIterator<Item = S>, S: Into<String>>(segments: I) -> Self {
        Self::new(Method::PUT, segments)
    }

    pub fn patch<I: IntoIterator<Item = S>, S: Into<String>>(segments: I) -> Self {
        Self::new(Method::PATCH, segments)
    }

    pub fn delete<I: IntoIterator<Item = S>, S: Into<String>>(segments: I) -> Self {
        Self::new(Method::DELETE, segments)
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn token(mut self, token: Option<AccessToken>) -> Self {
        self.token = token;
        self
    }

    /// Unencoded path below the API root, e.g. `repos/acme/widgets/labels`.
    pub fn path(&self) -> String {
        self.segments.join("/")
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Sends API requests and returns the decoded JSON body.
///
/// An empty response body (e.g. `204 No Content`) decodes to `Value::Null`.
#[async_trait]
pub trait GiteaTransport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<Value>;
}

/// Production transport backed by a pooled `reqwest::Client`.
pub struct HttpTransport {
    client: Client,
    base_url: Url,
}

impl HttpTransport {
    pub fn new(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    pub fn from_config(config: &ServerConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("gitea-mcp/", env!("CARGO_PKG_VERSION")))
            .danger_accept_invalid_certs(config.insecure)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self::new(client, config.api_base()?))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

#[async_trait]
impl GiteaTransport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<Value> {
        let url = build_url(&self.base_url, &request)?;
        debug!(method = %request.method, %url, "sending Gitea request");

        let mut builder = self.client.request(request.method.clone(), url);
        if let Some(token) = &request.token {
            builder = builder.header(AUTHORIZATION, format!("token {}", token.expose()));
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            bail!("Gitea API returned {}: {}", status, extract_message(&text));
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).context("Gitea API returned malformed JSON")
    }
}

/// Join the request path and query onto the API root.
pub fn build_url(base: &Url, request: &ApiRequest) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| anyhow!("{base} cannot be used as an API root"))?
        .pop_if_empty()
        .extend(&request.segments);
    if !request.query.is_empty() {
        url.query_pairs_mut().extend_pairs(&request.query);
    }
    Ok(url)
}

/// Pull the `message` field out of a Gitea error body, falling back to the raw text.
fn extract_message(body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        if let Some(Value::String(message)) = map.get("message") {
            return message.clone();
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "empty response body".to_string();
    }
    trimmed.chars().take(MAX_ERROR_BODY).collect()
}
