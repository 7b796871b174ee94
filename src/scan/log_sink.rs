//! Scan log sink
//!
//! Append-only record of timestamped scan messages. Readers may take snapshots
//! while a scan is writing, or subscribe to a push stream of new entries.

use crate::types::LogEntry;
use chrono::Utc;
use parking_lot::RwLock;
use tokio::sync::broadcast;
use tracing::info;

/// Buffered entries per subscriber before it starts lagging.
pub const DEFAULT_SUBSCRIBER_CAPACITY: usize = 1024;

/// In-memory log of the current scan
#[derive(Debug)]
pub struct LogSink {
    entries: RwLock<Vec<LogEntry>>,
    events: broadcast::Sender<LogEntry>,
}

impl LogSink {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_SUBSCRIBER_CAPACITY)
    }

    /// Sink whose subscribers buffer up to `capacity` unread entries.
    pub fn with_capacity(capacity: usize) -> Self {
        let (events, _) = broadcast::channel(capacity.max(1));
        Self {
            entries: RwLock::new(Vec::new()),
            events,
        }
    }

    /// Drop every entry. Subscribers stay connected.
    pub fn reset(&self) {
        self.entries.write().clear();
    }

    /// Stamp and record a message.
    ///
    /// Timestamps never go backwards within one scan, even if the wall clock does.
    pub fn append(&self, message: impl Into<String>) -> LogEntry {
        let mut entries = self.entries.write();
        let now = Utc::now();
        let timestamp = entries
            .last()
            .map_or(now, |last| now.max(last.timestamp));
        let entry = LogEntry::new(timestamp, message);
        entries.push(entry.clone());

        // Published under the lock so subscribers see the same order as snapshots.
        // An error only means nobody is listening.
        let _ = self.events.send(entry.clone());
        drop(entries);

        info!(target: "fleetsweep::scan", "{}", entry.message);
        entry
    }

    /// All entries since the last reset, in insertion order.
    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.entries.read().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Stream of entries appended from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
        self.events.subscribe()
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new()
    }
}
