//! Node-agent HTTP client.

use super::http::{base_url, ensure_success, json_kind};
use super::NodeAgent;
use crate::config::NodeAgentConfig;
use crate::error::SweepError;
use crate::types::{FileRecord, InstanceId};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

/// Logged verbatim by the walker.
pub const FILES_FIELD_ERROR: &str = "Files field is missing or not an array.";

/// Node agent reached over HTTP with basic auth.
pub struct HttpNodeAgent {
    base_url: Option<String>,
    username: String,
    key: String,
    client: Client,
}

impl HttpNodeAgent {
    pub fn new(config: &NodeAgentConfig, client: Client) -> Self {
        Self {
            base_url: config.url.clone(),
            username: config.username.clone(),
            key: config.key.clone(),
            client,
        }
    }
}

#[async_trait]
impl NodeAgent for HttpNodeAgent {
    async fn list_files(&self, id: &InstanceId, path: &str) -> Result<Vec<FileRecord>, SweepError> {
        let url = format!("{}/fs/{}/files", base_url(self.base_url.as_deref())?, id);
        debug!(url = %url, path, "Listing files");

        let response = self
            .client
            .get(&url)
            .query(&[("path", path)])
            .basic_auth(&self.username, Some(&self.key))
            .send()
            .await?;
        let body = ensure_success(response)?.text().await?;
        parse_file_listing(&body)
    }
}

/// Decode a listing body of the form `{"files": [...]}`.
pub fn parse_file_listing(body: &str) -> Result<Vec<FileRecord>, SweepError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|_| SweepError::UnexpectedResponse(FILES_FIELD_ERROR.to_string()))?;

    match value.get("files") {
        Some(files @ Value::Array(_)) => serde_json::from_value(files.clone()).map_err(|e| {
            SweepError::UnexpectedResponse(format!("Malformed file record: {}", e))
        }),
        Some(other) => {
            debug!(kind = json_kind(other), "Listing files field has the wrong type");
            Err(SweepError::UnexpectedResponse(FILES_FIELD_ERROR.to_string()))
        }
        None => Err(SweepError::UnexpectedResponse(FILES_FIELD_ERROR.to_string())),
    }
}
