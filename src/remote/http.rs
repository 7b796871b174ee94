//! Shared HTTP plumbing for the upstream clients.

use crate::config::HttpConfig;
use crate::error::SweepError;
use reqwest::{Client, Response};
use std::time::Duration;

/// Build the client shared by both upstream APIs.
pub fn build_http_client(config: &HttpConfig) -> Result<Client, SweepError> {
    let mut builder = Client::builder().user_agent(concat!(
        env!("CARGO_PKG_NAME"),
        "/",
        env!("CARGO_PKG_VERSION")
    ));
    if let Some(secs) = config.request_timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder
        .build()
        .map_err(|e| SweepError::Config(format!("Failed to build HTTP client: {}", e)))
}

/// Validated base URL without trailing slashes.
pub(crate) fn base_url(url: Option<&str>) -> Result<&str, SweepError> {
    url.map(|u| u.trim().trim_end_matches('/'))
        .filter(|u| !u.is_empty())
        .ok_or_else(|| SweepError::ConfigurationMissing("Base URL".to_string()))
}

/// Map non-success statuses to `HttpStatus`.
pub(crate) fn ensure_success(response: Response) -> Result<Response, SweepError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(SweepError::HttpStatus {
            status: status.as_u16(),
        })
    }
}

/// Name of a JSON value's type, for shape errors.
pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
