//! Remote directory walker
//!
//! Depth-first, sequential traversal of one instance's filesystem through the
//! node agent. Each listing entry is logged, descended into when it is a
//! non-editable directory, then classified; suspicious entries suspend the
//! instance on the spot.

use super::classifier::{classify, ClassifierRules, Verdict};
use super::instances::SuspensionActuator;
use super::log_sink::LogSink;
use crate::error::SweepError;
use crate::remote::node_agent::FILES_FIELD_ERROR;
use crate::remote::NodeAgent;
use crate::types::{FileRecord, InstanceId};
use futures::future::{BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;
use tracing::{debug, warn};

/// How child paths are built when descending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathMode {
    /// `parent/child`
    #[default]
    Joined,
    /// The child's bare name, whatever the parent. Only correct one level deep;
    /// kept for node agents that were written against that behaviour.
    BareName,
}

/// What an unparsable `server.jar` size does to the rest of its listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownSizePolicy {
    /// Stop processing the remaining siblings in that listing.
    #[default]
    AbortListing,
    /// Skip just the offending record.
    SkipRecord,
}

/// Walker behaviour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkOptions {
    #[serde(default)]
    pub path_mode: PathMode,

    #[serde(default)]
    pub unknown_size: UnknownSizePolicy,

    /// Directories nested deeper than this are logged and not listed.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_max_depth() -> usize {
    64
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            path_mode: PathMode::default(),
            unknown_size: UnknownSizePolicy::default(),
            max_depth: default_max_depth(),
        }
    }
}

impl WalkOptions {
    /// Path to request for `child` found while listing `parent`.
    pub fn child_path(&self, parent: &str, child: &str) -> String {
        match self.path_mode {
            PathMode::BareName => child.to_string(),
            PathMode::Joined => {
                let parent = parent.trim_end_matches('/');
                if parent.is_empty() {
                    child.to_string()
                } else {
                    format!("{}/{}", parent, child)
                }
            }
        }
    }
}

/// Counters for one walk (or a whole scan, once summed).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkStats {
    pub files_seen: usize,
    pub directories_entered: usize,
    pub detections: usize,
    pub suspend_requests: usize,
    pub suspensions: usize,
    pub listing_failures: usize,
    pub unknown_sizes: usize,
}

impl AddAssign for WalkStats {
    fn add_assign(&mut self, other: Self) {
        self.files_seen += other.files_seen;
        self.directories_entered += other.directories_entered;
        self.detections += other.detections;
        self.suspend_requests += other.suspend_requests;
        self.suspensions += other.suspensions;
        self.listing_failures += other.listing_failures;
        self.unknown_sizes += other.unknown_sizes;
    }
}

/// Walks one instance at a time.
pub struct RemoteWalker<'a> {
    agent: &'a dyn NodeAgent,
    actuator: &'a SuspensionActuator,
    sink: &'a LogSink,
    rules: &'a ClassifierRules,
    options: &'a WalkOptions,
}

impl<'a> RemoteWalker<'a> {
    pub fn new(
        agent: &'a dyn NodeAgent,
        actuator: &'a SuspensionActuator,
        sink: &'a LogSink,
        rules: &'a ClassifierRules,
        options: &'a WalkOptions,
    ) -> Self {
        Self {
            agent,
            actuator,
            sink,
            rules,
            options,
        }
    }

    /// Walk the tree under `path` (empty for the root). Never fails.
    pub async fn walk(&self, id: &InstanceId, path: &str) -> WalkStats {
        let mut stats = WalkStats::default();
        self.walk_dir(id, path, 0, &mut stats).await;
        stats
    }

    fn walk_dir<'b>(
        &'b self,
        id: &'b InstanceId,
        path: &'b str,
        depth: usize,
        stats: &'b mut WalkStats,
    ) -> BoxFuture<'b, ()> {
        async move {
            if depth > self.options.max_depth {
                warn!(instance = %id, path, depth, "Maximum directory depth reached");
                self.sink.append(format!(
                    "Maximum directory depth reached for instance with ID: {} at path: {}",
                    id, path
                ));
                return;
            }
            if depth > 0 {
                stats.directories_entered += 1;
            }

            let files = match self.agent.list_files(id, path).await {
                Ok(files) => files,
                Err(err) => {
                    stats.listing_failures += 1;
                    self.log_listing_error(id, path, &err);
                    return;
                }
            };
            debug!(instance = %id, path, entries = files.len(), "Listed directory");

            for record in &files {
                stats.files_seen += 1;
                self.sink.append(format!(
                    "File: {} Extension: {} Purpose: {}",
                    record.name, record.extension, record.purpose
                ));

                if record.is_traversable() {
                    let child = self.options.child_path(path, &record.name);
                    self.walk_dir(id, &child, depth + 1, &mut *stats).await;
                }

                if !self.apply_verdicts(id, record, stats).await {
                    warn!(instance = %id, path, "Abandoning rest of listing after unknown size format");
                    return;
                }
            }
        }
        .boxed()
    }

    /// Act on every verdict for `record`. Returns `false` when the rest of the
    /// listing must be abandoned.
    async fn apply_verdicts(
        &self,
        id: &InstanceId,
        record: &FileRecord,
        stats: &mut WalkStats,
    ) -> bool {
        for verdict in classify(record, self.rules).into_verdicts() {
            match &verdict {
                Verdict::Clean => {}
                Verdict::UnknownSizeFormat { .. } => {
                    stats.unknown_sizes += 1;
                    if let Some(reason) = verdict.reason() {
                        self.sink.append(reason);
                    }
                    return self.options.unknown_size == UnknownSizePolicy::SkipRecord;
                }
                _ => {
                    stats.detections += 1;
                    stats.suspend_requests += 1;
                    if self.actuator.suspend(id).await {
                        stats.suspensions += 1;
                    }
                    if let Some(line) = verdict.detection_line(id) {
                        self.sink.append(line);
                    }
                }
            }
        }
        true
    }

    fn log_listing_error(&self, id: &InstanceId, path: &str, err: &SweepError) {
        warn!(instance = %id, path, error = %err, "File listing failed");
        let message = match err {
            SweepError::ConfigurationMissing(_) => err.to_string(),
            SweepError::UnexpectedResponse(message) if message == FILES_FIELD_ERROR => {
                message.clone()
            }
            SweepError::HttpStatus { status } => format!(
                "Failed to retrieve files for instance with ID: {} at path: {}. Status: {}",
                id, path, status
            ),
            _ => format!(
                "Error retrieving files for instance with ID: {} at path: {}: {}",
                id, path, err
            ),
        };
        self.sink.append(message);
    }
}
