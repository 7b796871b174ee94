//! Fleetsweep: abuse-detection sweep for hosted game-server fleets
//!
//! Enumerates running instances through the control-plane API, walks each
//! instance's filesystem through the node-agent API, flags scripts, miner
//! binaries and undersized server jars, and suspends any instance that matches.

pub mod concurrency;
pub mod config;
pub mod error;
pub mod logging;
pub mod remote;
pub mod scan;
pub mod tooling;
pub mod types;

pub use config::SweepConfig;
pub use error::SweepError;
pub use scan::{ScanOutcome, ScanReport, Scanner};
pub use types::{FileRecord, Instance, InstanceId, LogEntry};
