//! Control-plane HTTP client.

use super::http::{base_url, ensure_success, json_kind};
use super::ControlPlane;
use crate::config::ControlPlaneConfig;
use crate::error::SweepError;
use crate::types::{Instance, InstanceId};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

/// Control plane reached over HTTP with a query-string API key.
pub struct HttpControlPlane {
    base_url: Option<String>,
    key: String,
    client: Client,
}

impl HttpControlPlane {
    pub fn new(config: &ControlPlaneConfig, client: Client) -> Self {
        Self {
            base_url: config.url.clone(),
            key: config.key.clone(),
            client,
        }
    }
}

#[async_trait]
impl ControlPlane for HttpControlPlane {
    async fn fetch_instances(&self) -> Result<Vec<Instance>, SweepError> {
        let url = format!("{}/api/instances", base_url(self.base_url.as_deref())?);
        debug!(url = %url, "Fetching instance list");

        let response = self
            .client
            .get(&url)
            .query(&[("key", self.key.as_str())])
            .send()
            .await?;
        let body = ensure_success(response)?.text().await?;
        parse_instance_list(&body)
    }

    async fn suspend(&self, id: &InstanceId) -> Result<(), SweepError> {
        let url = format!(
            "{}/api/instances/suspend",
            base_url(self.base_url.as_deref())?
        );
        debug!(url = %url, instance = %id, "Requesting suspension");

        let response = self
            .client
            .get(&url)
            .query(&[("key", self.key.as_str()), ("id", id.as_str())])
            .send()
            .await?;
        ensure_success(response)?;
        Ok(())
    }
}

/// Decode an instance-list body. An empty or `null` body means no data.
pub fn parse_instance_list(body: &str) -> Result<Vec<Instance>, SweepError> {
    let value: Value = if body.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(body).map_err(|e| {
            SweepError::UnexpectedResponse(format!("Invalid instance list JSON: {}", e))
        })?
    };

    match value {
        Value::Null => Err(SweepError::UnexpectedResponse(
            "No data received in response".to_string(),
        )),
        Value::Array(_) => serde_json::from_value(value).map_err(|e| {
            SweepError::UnexpectedResponse(format!("Malformed instance record: {}", e))
        }),
        other => Err(SweepError::UnexpectedResponse(format!(
            "Expected an instance array, got {}",
            json_kind(&other)
        ))),
    }
}
