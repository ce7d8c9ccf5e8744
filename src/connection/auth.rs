//! Credential handling.
//!
//! Credentials live in process memory for the adapter's lifetime and are
//! injected as a header into every outgoing request. Debug output and
//! connection-string rendering never expose the secret.

use crate::core::{ApiError, Result};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use std::fmt;

pub const DEFAULT_API_KEY_HEADER: &str = "X-API-Key";

#[derive(Clone, PartialEq, Eq)]
pub enum AuthMode {
    None,
    ApiKey { header: String, key: String },
    Bearer { token: String },
}

impl AuthMode {
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer {
            token: token.into(),
        }
    }

    /// API key sent in the default `X-API-Key` header.
    pub fn api_key(key: impl Into<String>) -> Self {
        Self::ApiKey {
            header: DEFAULT_API_KEY_HEADER.to_string(),
            key: key.into(),
        }
    }

    pub fn api_key_with_header(header: impl Into<String>, key: impl Into<String>) -> Self {
        Self::ApiKey {
            header: header.into(),
            key: key.into(),
        }
    }

    pub fn mode_name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::ApiKey { .. } => "api_key",
            Self::Bearer { .. } => "bearer",
        }
    }

    /// Inject the credential header into the client's default headers.
    pub fn apply(&self, headers: &mut HeaderMap) -> Result<()> {
        match self {
            Self::None => Ok(()),
            Self::ApiKey { header, key } => {
                let name = HeaderName::from_bytes(header.as_bytes()).map_err(|_| {
                    ApiError::Config(format!("invalid API key header name: '{}'", header))
                })?;
                let mut value = HeaderValue::from_str(key)
                    .map_err(|_| ApiError::Config("API key contains invalid characters".into()))?;
                value.set_sensitive(true);
                headers.insert(name, value);
                Ok(())
            }
            Self::Bearer { token } => {
                let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                    .map_err(|_| ApiError::Config("token contains invalid characters".into()))?;
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
                Ok(())
            }
        }
    }
}

impl Default for AuthMode {
    fn default() -> Self {
        Self::None
    }
}

impl fmt::Debug for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::ApiKey { header, .. } => write!(f, "ApiKey {{ header: {:?}, key: \"***\" }}", header),
            Self::Bearer { .. } => write!(f, "Bearer {{ token: \"***\" }}"),
        }
    }
}
