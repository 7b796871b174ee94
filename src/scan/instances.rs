//! Instance enumeration and suspension.
//!
//! Both wrap a [`ControlPlane`] and never fail: every problem is written to the
//! scan log and turned into "nothing to do".

use super::log_sink::LogSink;
use crate::error::SweepError;
use crate::remote::ControlPlane;
use crate::types::{Instance, InstanceId};
use std::sync::Arc;
use tracing::warn;

/// Lists the instances a scan should visit.
pub struct InstanceEnumerator {
    control_plane: Arc<dyn ControlPlane>,
    sink: Arc<LogSink>,
}

impl InstanceEnumerator {
    pub fn new(control_plane: Arc<dyn ControlPlane>, sink: Arc<LogSink>) -> Self {
        Self {
            control_plane,
            sink,
        }
    }

    /// Non-suspended instances in the order the control plane returned them.
    pub async fn list_active(&self) -> Vec<Instance> {
        match self.control_plane.fetch_instances().await {
            Ok(instances) => instances
                .into_iter()
                .filter(|instance| !instance.suspended)
                .collect(),
            Err(err) => {
                warn!(error = %err, "Instance listing failed");
                let message = match &err {
                    SweepError::ConfigurationMissing(_) | SweepError::UnexpectedResponse(_) => {
                        err.to_string()
                    }
                    SweepError::HttpStatus { status } => {
                        format!("Failed to retrieve instances. Status: {}", status)
                    }
                    _ => format!("Error retrieving instances: {}", err),
                };
                self.sink.append(message);
                Vec::new()
            }
        }
    }
}

/// Issues suspend commands. Repeated calls for one instance are expected.
pub struct SuspensionActuator {
    control_plane: Arc<dyn ControlPlane>,
    sink: Arc<LogSink>,
}

impl SuspensionActuator {
    pub fn new(control_plane: Arc<dyn ControlPlane>, sink: Arc<LogSink>) -> Self {
        Self {
            control_plane,
            sink,
        }
    }

    /// Suspend `id`, logging the result. Returns whether the control plane accepted it.
    pub async fn suspend(&self, id: &InstanceId) -> bool {
        match self.control_plane.suspend(id).await {
            Ok(()) => {
                self.sink.append(format!(
                    "Server with ID: {} has been suspended successfully.",
                    id
                ));
                true
            }
            Err(err) => {
                warn!(instance = %id, error = %err, "Suspension failed");
                let message = match &err {
                    SweepError::ConfigurationMissing(_) => err.to_string(),
                    SweepError::HttpStatus { status } => format!(
                        "Failed to suspend server with ID: {}. Status: {}",
                        id, status
                    ),
                    _ => format!("Error suspending server with ID: {}: {}", id, err),
                };
                self.sink.append(message);
                false
            }
        }
    }
}
