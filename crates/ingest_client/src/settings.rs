use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use url::Url;

pub(crate) const UPLOAD_PATH: &str = "api/upload";
pub(crate) const INGEST_STATUS_PATH: &str = "api/ingest-status";
pub(crate) const QUERY_PATH: &str = "api/query";
pub(crate) const STATS_PATH: &str = "api/stats";

#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Root the `api/...` endpoints are resolved against.
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Total timeout for upload, query and stats calls. The status feed has none.
    pub request_timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000/".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("invalid base url {base_url}: {message}")]
    InvalidBaseUrl { base_url: String, message: String },
}

impl ClientSettings {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Resolves `path` below `base_url`, keeping any path prefix the base carries.
    pub fn endpoint(&self, path: &str) -> Result<Url, SettingsError> {
        let invalid = |message: String| SettingsError::InvalidBaseUrl {
            base_url: self.base_url.clone(),
            message,
        };
        let mut base = Url::parse(self.base_url.trim()).map_err(|err| invalid(err.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(invalid("url cannot be a base".into()));
        }
        if !base.path().ends_with('/') {
            let with_slash = format!("{}/", base.path());
            base.set_path(&with_slash);
        }
        base.join(path).map_err(|err| invalid(err.to_string()))
    }

    pub(crate) fn http_client(&self, timeout: Option<Duration>) -> reqwest::Result<reqwest::Client> {
        let builder = reqwest::Client::builder().connect_timeout(self.connect_timeout);
        let builder = match timeout {
            Some(timeout) => builder.timeout(timeout),
            None => builder,
        };
        builder.build()
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

/// Extracts the backend's `{detail}` message from an error response body.
pub(crate) fn error_detail(body: &[u8]) -> Option<String> {
    let body: ErrorBody = serde_json::from_slice(body).ok()?;
    match body.detail {
        serde_json::Value::String(detail) if !detail.trim().is_empty() => Some(detail),
        serde_json::Value::String(_) | serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}
