//! Upstream API clients
//!
//! The scan pipeline only talks to the control plane and the node agent
//! through these traits, so tests can swap in in-memory fakes.

pub mod control_plane;
pub mod http;
pub mod node_agent;

pub use control_plane::HttpControlPlane;
pub use http::build_http_client;
pub use node_agent::HttpNodeAgent;

use crate::error::SweepError;
use crate::types::{FileRecord, Instance, InstanceId};
use async_trait::async_trait;

/// Instance listing and suspension.
#[async_trait]
pub trait ControlPlane: Send + Sync {
    /// Every instance the control plane knows about, suspended ones included.
    async fn fetch_instances(&self) -> Result<Vec<Instance>, SweepError>;

    /// Ask the control plane to suspend one instance.
    async fn suspend(&self, id: &InstanceId) -> Result<(), SweepError>;
}

/// Per-instance filesystem listing.
#[async_trait]
pub trait NodeAgent: Send + Sync {
    /// One directory level of `path` (empty for the instance root).
    async fn list_files(&self, id: &InstanceId, path: &str) -> Result<Vec<FileRecord>, SweepError>;
}
