//! Configuration
//!
//! Explicit configuration passed to each component at construction. Loaded by
//! [`ConfigLoader`] from defaults, config files and `FLEETSWEEP__*` environment
//! variables.

pub mod facade;
pub mod merge;
pub mod sources;

pub use facade::ConfigLoader;

use crate::logging::LoggingConfig;
use crate::scan::classifier::ClassifierRules;
use crate::scan::walker::WalkOptions;
use serde::{Deserialize, Serialize};

const REDACTED: &str = "***";

/// Root configuration for a sweep.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SweepConfig {
    #[serde(default)]
    pub control_plane: ControlPlaneConfig,

    #[serde(default)]
    pub node_agent: NodeAgentConfig,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub rules: ClassifierRules,

    #[serde(default)]
    pub walk: WalkOptions,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Control-plane API access (instance listing and suspension).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ControlPlaneConfig {
    /// Base URL; absence is reported per call, not at load time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// API key sent as the `key` query parameter.
    #[serde(default)]
    pub key: String,
}

/// Node-agent API access (per-instance file listings).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeAgentConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Basic-auth password.
    #[serde(default)]
    pub key: String,

    /// Basic-auth username.
    #[serde(default = "default_node_username")]
    pub username: String,
}

fn default_node_username() -> String {
    "Skyport".to_string()
}

impl Default for NodeAgentConfig {
    fn default() -> Self {
        Self {
            url: None,
            key: String::new(),
            username: default_node_username(),
        }
    }
}

/// Shared HTTP client settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout. Unset means remote calls may wait indefinitely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

impl SweepConfig {
    /// Copy of the configuration safe to print: credentials are masked.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if !copy.control_plane.key.is_empty() {
            copy.control_plane.key = REDACTED.to_string();
        }
        if !copy.node_agent.key.is_empty() {
            copy.node_agent.key = REDACTED.to_string();
        }
        copy
    }

    /// Human-readable notes about settings that will make remote calls fail.
    pub fn missing_settings(&self) -> Vec<String> {
        let mut missing = Vec::new();
        if is_blank(self.control_plane.url.as_deref()) {
            missing.push("control_plane.url is not set".to_string());
        }
        if is_blank(self.node_agent.url.as_deref()) {
            missing.push("node_agent.url is not set".to_string());
        }
        if self.control_plane.key.is_empty() {
            missing.push("control_plane.key is empty".to_string());
        }
        if self.node_agent.key.is_empty() {
            missing.push("node_agent.key is empty".to_string());
        }
        missing
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map(str::trim).map_or(true, str::is_empty)
}
