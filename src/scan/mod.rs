//! Scan-and-classify pipeline
//!
//! Enumerate active instances, walk each instance's filesystem through the
//! node agent, classify every entry, suspend on detection, and record all of
//! it in the scan log.

pub mod classifier;
pub mod instances;
pub mod log_sink;
pub mod orchestrator;
pub mod walker;

pub use classifier::{classify, parse_size_bytes, Classification, ClassifierRules, Verdict};
pub use instances::{InstanceEnumerator, SuspensionActuator};
pub use log_sink::LogSink;
pub use orchestrator::{ScanOutcome, ScanReport, ScanStats, Scanner};
pub use walker::{PathMode, RemoteWalker, UnknownSizePolicy, WalkOptions, WalkStats};
