//! Scan orchestration
//!
//! One scan enumerates active instances and walks each of them in turn, strictly
//! sequentially. Scans are serialized: a trigger arriving while a scan runs is
//! rejected rather than clobbering the live log.

use super::classifier::ClassifierRules;
use super::instances::{InstanceEnumerator, SuspensionActuator};
use super::log_sink::LogSink;
use super::walker::{RemoteWalker, WalkOptions, WalkStats};
use crate::concurrency::ScanGuard;
use crate::config::SweepConfig;
use crate::error::SweepError;
use crate::remote::{build_http_client, ControlPlane, HttpControlPlane, HttpNodeAgent, NodeAgent};
use crate::types::LogEntry;
use chrono::{DateTime, Utc};
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::broadcast;
use tracing::{error, info};

/// Aggregate counters for a scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStats {
    pub instances_scanned: usize,
    #[serde(flatten)]
    pub walk: WalkStats,
}

/// How a scan ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScanOutcome {
    Completed,
    /// The pipeline itself broke; per-call failures never end up here.
    Failed { error: String },
}

/// Result of one scan, including its full log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub outcome: ScanOutcome,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub stats: ScanStats,
    pub entries: Vec<LogEntry>,
}

impl ScanReport {
    pub fn is_completed(&self) -> bool {
        self.outcome == ScanOutcome::Completed
    }
}

/// Owns the pipeline components and the log sink shared with readers.
pub struct Scanner {
    enumerator: InstanceEnumerator,
    actuator: SuspensionActuator,
    node_agent: Arc<dyn NodeAgent>,
    sink: Arc<LogSink>,
    rules: ClassifierRules,
    walk_options: WalkOptions,
    guard: ScanGuard,
}

impl Scanner {
    pub fn new(
        control_plane: Arc<dyn ControlPlane>,
        node_agent: Arc<dyn NodeAgent>,
        rules: ClassifierRules,
        walk_options: WalkOptions,
    ) -> Self {
        let sink = Arc::new(LogSink::new());
        Self {
            enumerator: InstanceEnumerator::new(Arc::clone(&control_plane), Arc::clone(&sink)),
            actuator: SuspensionActuator::new(control_plane, Arc::clone(&sink)),
            node_agent,
            sink,
            rules,
            walk_options,
            guard: ScanGuard::new(),
        }
    }

    /// Scanner talking HTTP to the configured control plane and node agent.
    pub fn from_config(config: &SweepConfig) -> Result<Self, SweepError> {
        let client = build_http_client(&config.http)?;
        let control_plane = Arc::new(HttpControlPlane::new(&config.control_plane, client.clone()));
        let node_agent = Arc::new(HttpNodeAgent::new(&config.node_agent, client));
        Ok(Self::new(
            control_plane,
            node_agent,
            config.rules.clone(),
            config.walk.clone(),
        ))
    }

    /// Run one full scan.
    ///
    /// Fails only with `ScanInProgress`. Everything else, including a broken
    /// pipeline, is reported through the returned [`ScanReport`].
    pub async fn run_scan(&self) -> Result<ScanReport, SweepError> {
        let _permit = self.guard.try_begin()?;
        self.sink.reset();

        let started_at = Utc::now();
        let clock = Instant::now();
        info!("Scan started");

        let mut stats = ScanStats::default();
        let result = AssertUnwindSafe(self.process_all_instances(&mut stats))
            .catch_unwind()
            .await;

        let outcome = match result {
            Ok(()) => ScanOutcome::Completed,
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!(error = %message, "Scan aborted");
                self.sink
                    .append(format!("Error processing instances: {}", message));
                ScanOutcome::Failed {
                    error: SweepError::ScanFailed(message).to_string(),
                }
            }
        };

        let duration_ms = u64::try_from(clock.elapsed().as_millis()).unwrap_or(u64::MAX);
        info!(
            instances = stats.instances_scanned,
            detections = stats.walk.detections,
            suspensions = stats.walk.suspensions,
            duration_ms,
            "Scan finished"
        );

        Ok(ScanReport {
            outcome,
            started_at,
            duration_ms,
            stats,
            entries: self.sink.snapshot(),
        })
    }

    async fn process_all_instances(&self, stats: &mut ScanStats) {
        let instances = self.enumerator.list_active().await;
        let walker = RemoteWalker::new(
            self.node_agent.as_ref(),
            &self.actuator,
            &self.sink,
            &self.rules,
            &self.walk_options,
        );

        for instance in instances {
            self.sink
                .append(format!("Processing instance with ID: {}", instance.id));
            stats.walk += walker.walk(&instance.id, "").await;
            stats.instances_scanned += 1;
        }
    }

    /// Entries of the current (or last) scan.
    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.sink.snapshot()
    }

    /// Live stream of log entries across all future scans.
    pub fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
        self.sink.subscribe()
    }

    pub fn is_scanning(&self) -> bool {
        self.guard.is_active()
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
