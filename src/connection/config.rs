//! Connection configuration.
//!
//! Built either through the builder API or parsed from a connection
//! string of the form
//! `jsonapi://host[:port][/path]?token=...&envelope=data&timeout=30`.

use super::auth::AuthMode;
use crate::core::{ApiError, Result};
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

/// Table name served when no endpoints are configured: the base URL
/// itself is treated as the record source.
pub const DEFAULT_TABLE: &str = "data";

#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Base API URL, without a trailing slash.
    pub base_url: String,

    /// Credential attached to every request.
    pub auth: AuthMode,

    /// Request timeout; hitting it fails the query with a transport error.
    pub timeout: Duration,

    /// Dot-separated path to the record array inside a response envelope.
    pub envelope: Option<String>,

    /// Per-table endpoint path overrides. Tables without an override map
    /// to `/{table}`.
    pub endpoints: HashMap<String, String>,

    /// Extra headers sent with every request.
    pub headers: HashMap<String, String>,

    /// Row count requested when sampling an endpoint for schema inference.
    pub sample_limit: usize,

    /// Name of the page-size query parameter.
    pub limit_param: String,

    /// Client-side row cap applied when a query carries no LIMIT.
    pub max_rows: usize,
}

impl ConnectionConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            auth: AuthMode::None,
            timeout: Duration::from_secs(30),
            envelope: None,
            endpoints: HashMap::new(),
            headers: HashMap::new(),
            sample_limit: 5,
            limit_param: "limit".to_string(),
            max_rows: 1000,
        }
    }

    pub fn auth(mut self, auth: AuthMode) -> Self {
        self.auth = auth;
        self
    }

    pub fn bearer_token(self, token: impl Into<String>) -> Self {
        self.auth(AuthMode::bearer(token))
    }

    pub fn api_key(self, key: impl Into<String>) -> Self {
        self.auth(AuthMode::api_key(key))
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn envelope(mut self, path: impl Into<String>) -> Self {
        self.envelope = Some(path.into());
        self
    }

    /// Register a table backed by an explicit endpoint path.
    pub fn endpoint(mut self, table: impl Into<String>, path: impl Into<String>) -> Self {
        self.endpoints.insert(table.into(), path.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn sample_limit(mut self, limit: usize) -> Self {
        self.sample_limit = limit;
        self
    }

    pub fn limit_param(mut self, name: impl Into<String>) -> Self {
        self.limit_param = name.into();
        self
    }

    pub fn max_rows(mut self, max: usize) -> Self {
        self.max_rows = max;
        self
    }

    /// Resolve a table name to its endpoint path.
    pub fn endpoint_path(&self, table: &str) -> String {
        if let Some(path) = self.endpoints.get(table) {
            normalize_path(path)
        } else if self.endpoints.is_empty() && table == DEFAULT_TABLE {
            String::new()
        } else {
            format!("/{}", table)
        }
    }

    /// Tables this connection serves: the configured endpoints, or the
    /// single default table when none are configured.
    pub fn table_names(&self) -> Vec<String> {
        if self.endpoints.is_empty() {
            return vec![DEFAULT_TABLE.to_string()];
        }
        let mut names: Vec<String> = self.endpoints.keys().cloned().collect();
        names.sort();
        names
    }

    /// Parse a `jsonapi://` connection string.
    ///
    /// Port 443 selects https, any other port is carried over verbatim.
    /// Recognized query keys: `token`, `api_key`, `api_key_header`,
    /// `timeout` (seconds), `envelope`, `limit_param`, `sample_limit`,
    /// `max_rows`. Unrecognized keys become request headers.
    pub fn from_url(raw: &str) -> Result<Self> {
        let parsed =
            Url::parse(raw).map_err(|e| ApiError::Config(format!("invalid connection URL: {}", e)))?;

        if parsed.scheme() != "jsonapi" {
            return Err(ApiError::Config(format!(
                "connection URL must use the jsonapi:// scheme, got '{}'",
                parsed.scheme()
            )));
        }

        let host = parsed
            .host_str()
            .ok_or_else(|| ApiError::Config("connection URL is missing a host".into()))?;

        let mut base = match parsed.port() {
            Some(443) => format!("https://{}", host),
            Some(80) | None => format!("http://{}", host),
            Some(port) => format!("http://{}:{}", host, port),
        };
        let path = parsed.path().trim_end_matches('/');
        if !path.is_empty() {
            base.push_str(path);
        }

        let mut config = Self::new(base);

        let params: HashMap<String, String> = parsed
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        let token = params.get("token");
        let api_key = params.get("api_key");
        if token.is_some() && api_key.is_some() {
            return Err(ApiError::Config(
                "connection URL sets both 'token' and 'api_key'".into(),
            ));
        }

        if let Some(token) = token {
            config.auth = AuthMode::bearer(token.clone());
        } else if let Some(key) = api_key {
            config.auth = match params.get("api_key_header") {
                Some(header) => AuthMode::api_key_with_header(header.clone(), key.clone()),
                None => AuthMode::api_key(key.clone()),
            };
        }

        for (key, value) in &params {
            match key.as_str() {
                "token" | "api_key" | "api_key_header" => {}
                "timeout" => {
                    let secs: u64 = value.parse().map_err(|_| {
                        ApiError::Config(format!("invalid timeout value: '{}'", value))
                    })?;
                    config.timeout = Duration::from_secs(secs);
                }
                "envelope" => config.envelope = Some(value.clone()),
                "limit_param" => config.limit_param = value.clone(),
                "sample_limit" => {
                    config.sample_limit = value.parse().map_err(|_| {
                        ApiError::Config(format!("invalid sample_limit value: '{}'", value))
                    })?;
                }
                "max_rows" => {
                    config.max_rows = value.parse().map_err(|_| {
                        ApiError::Config(format!("invalid max_rows value: '{}'", value))
                    })?;
                }
                // Anything else travels as a request header
                other => {
                    config.headers.insert(other.to_string(), value.clone());
                }
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Connection string form with the credential redacted.
    pub fn to_url(&self) -> String {
        match &self.auth {
            AuthMode::None => self.base_url.clone(),
            AuthMode::Bearer { .. } => format!("{}?token=***", self.base_url),
            AuthMode::ApiKey { .. } => format!("{}?api_key=***", self.base_url),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let parsed = Url::parse(&self.base_url)
            .map_err(|e| ApiError::Config(format!("invalid base URL '{}': {}", self.base_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::Config(format!(
                "base URL must be http or https, got '{}'",
                parsed.scheme()
            )));
        }
        if self.timeout.is_zero() {
            return Err(ApiError::Config("timeout must be > 0".into()));
        }
        if self.sample_limit == 0 {
            return Err(ApiError::Config("sample_limit must be > 0".into()));
        }
        if self.max_rows == 0 {
            return Err(ApiError::Config("max_rows must be > 0".into()));
        }
        if self.limit_param.is_empty() {
            return Err(ApiError::Config("limit_param cannot be empty".into()));
        }
        Ok(())
    }
}

fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}
