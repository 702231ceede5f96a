//! Process-wide settings for the Gitea MCP server.

use std::time::Duration;

use anyhow::{Result, anyhow, bail};
use url::Url;

use crate::types::AccessToken;

pub const DEFAULT_HOST: &str = "https://gitea.com";
pub const DEFAULT_BIND: &str = "127.0.0.1:8080";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Gitea instance root, without the `/api/v1` suffix.
    pub host: Url,
    /// Default credentials; HTTP callers may override per request.
    pub token: Option<AccessToken>,
    /// Refuse and hide every tool that changes remote state.
    pub read_only: bool,
    /// Skip TLS certificate verification.
    pub insecure: bool,
    pub timeout: Duration,
    /// Listen address for the HTTP transport.
    pub bind: String,
}

impl ServerConfig {
    /// Parse and normalize `host`; everything else starts at its default.
    pub fn new(host: &str) -> Result<Self> {
        Ok(Self::for_host(normalize_host(host)?))
    }

    pub fn for_host(host: Url) -> Self {
        Self {
            host,
            token: None,
            read_only: false,
            insecure: false,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            bind: DEFAULT_BIND.to_string(),
        }
    }

    /// An empty token is treated as no token.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .map(AccessToken::new);
        self
    }

    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn with_insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_bind(mut self, bind: impl Into<String>) -> Self {
        self.bind = bind.into();
        self
    }

    /// REST API root, always ending in `/api/v1/`.
    pub fn api_base(&self) -> Result<Url> {
        let mut url = self.host.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("{} cannot be used as a Gitea host", self.host))?
            .pop_if_empty()
            .extend(["api", "v1", ""]);
        Ok(url)
    }

    pub fn validate(&self) -> Result<()> {
        if !matches!(self.host.scheme(), "http" | "https") {
            bail!("Gitea host must use http or https, got {}", self.host.scheme());
        }
        if self.timeout.is_zero() {
            bail!("request timeout must be greater than zero");
        }
        Ok(())
    }
}

/// Parse a host URL, requiring http(s) and dropping any trailing slash,
/// query or fragment.
pub fn normalize_host(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw.trim()).map_err(|e| anyhow!("invalid Gitea host {raw:?}: {e}"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("Gitea host must use http or https, got {}", url.scheme());
    }
    let path = url.path().trim_end_matches('/').to_string();
    url.set_path(&path);
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}
