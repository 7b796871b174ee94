//! Format scan output as text.

use crate::scan::{Classification, ScanOutcome, ScanReport};
use crate::types::{FileRecord, LogEntry};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;

/// Whether stdout should get ANSI colors: a TTY, and `NO_COLOR` unset.
pub fn stdout_supports_color() -> bool {
    use std::io::IsTerminal;
    std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
}

/// One log entry as a terminal line, `[timestamp] message`.
pub fn format_entry_line(entry: &LogEntry, color: bool) -> String {
    if !color {
        return entry.to_string();
    }
    let stamp = format!("[{}]", entry.timestamp_iso());
    let message = &entry.message;
    let styled = if message.starts_with("Suspicious") {
        format!("{}", message.red().bold())
    } else if message.contains("has been suspended") {
        format!("{}", message.yellow())
    } else if message.starts_with("Processing instance") {
        format!("{}", message.cyan().bold())
    } else if message.starts_with("Error")
        || message.starts_with("Failed")
        || message.starts_with("Unknown size")
        || message.contains("missing")
    {
        format!("{}", message.magenta())
    } else {
        message.clone()
    };
    format!("{} {}", stamp.dimmed(), styled)
}

/// Summary table printed after a scan.
pub fn format_scan_summary_text(report: &ScanReport) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Metric", "Value"]);

    let outcome = match &report.outcome {
        ScanOutcome::Completed => "completed".to_string(),
        ScanOutcome::Failed { error } => format!("failed: {}", error),
    };
    let stats = &report.stats;
    let rows = [
        ("Outcome", outcome),
        ("Started", report.started_at.to_rfc3339()),
        ("Duration", format!("{} ms", report.duration_ms)),
        ("Instances scanned", stats.instances_scanned.to_string()),
        ("Files seen", stats.walk.files_seen.to_string()),
        ("Directories entered", stats.walk.directories_entered.to_string()),
        ("Detections", stats.walk.detections.to_string()),
        (
            "Suspensions",
            format!("{}/{}", stats.walk.suspensions, stats.walk.suspend_requests),
        ),
        ("Listing failures", stats.walk.listing_failures.to_string()),
        ("Unknown sizes", stats.walk.unknown_sizes.to_string()),
        ("Log entries", report.entries.len().to_string()),
    ];
    for (metric, value) in rows {
        table.add_row(vec![metric.to_string(), value]);
    }
    table.to_string()
}

/// Verdicts for one record, one per line.
pub fn format_classification_text(record: &FileRecord, classification: &Classification) -> String {
    if classification.is_clean() {
        return format!("{}: clean", record.name);
    }
    let mut out = format!("{}:", record.name);
    for verdict in classification.verdicts() {
        let reason = verdict.reason().unwrap_or_default();
        let action = if verdict.is_suspicious() {
            "suspend"
        } else {
            "abort listing"
        };
        out.push_str(&format!("\n  - {} ({})", reason, action));
    }
    out
}
