//! CLI Tooling
//!
//! Command-line interface for running sweeps and inspecting configuration.

use super::format::{
    format_classification_text, format_entry_line, format_scan_summary_text,
    stdout_supports_color,
};
use crate::config::{ConfigLoader, SweepConfig};
use crate::error::SweepError;
use crate::logging::LoggingConfig;
use crate::scan::{classify, ScanReport, Scanner};
use crate::types::FileRecord;
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

/// Exit code for a scan whose pipeline broke.
pub const EXIT_SCAN_FAILED: i32 = 2;

/// Fleetsweep CLI - abuse-detection sweep for hosted instances
#[derive(Parser)]
#[command(name = "fleetsweep")]
#[command(about = "Scan hosted instances for abuse and suspend offenders")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (overrides default config loading)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (debug level)
    #[arg(long, global = true, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long, global = true)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Scan every active instance and suspend offenders
    Scan {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
        /// Do not stream log entries while the scan runs (text format only)
        #[arg(long)]
        quiet: bool,
    },
    /// Show the resolved configuration with credentials redacted
    Config {
        /// Output format (toml or json)
        #[arg(long, default_value = "toml")]
        format: String,
    },
    /// Classify one file record (JSON, node-agent shape) without scanning
    Classify {
        /// e.g. '{"name":"server.jar","size":"12MB"}'
        record: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

impl Cli {
    /// Fold logging flags into the loaded logging configuration.
    pub fn apply_logging_overrides(&self, logging: &mut LoggingConfig) {
        if self.verbose {
            logging.level = "debug".to_string();
        }
        if let Some(level) = &self.log_level {
            logging.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            logging.format = format.clone();
        }
        if let Some(output) = &self.log_output {
            logging.output = output.clone();
        }
        if let Some(file) = &self.log_file {
            logging.file = Some(file.clone());
        }
    }
}

/// Rendered command result and the process exit code it implies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub body: String,
    pub exit_code: i32,
}

impl CommandOutput {
    fn success(body: String) -> Self {
        Self { body, exit_code: 0 }
    }
}

/// Loaded configuration plus command dispatch.
pub struct CliContext {
    config: SweepConfig,
}

impl CliContext {
    /// Load configuration from `config_path`, or from the standard locations.
    pub fn new(config_path: Option<PathBuf>) -> Result<Self, SweepError> {
        let config = ConfigLoader::resolve(config_path.as_ref())?;
        Ok(Self { config })
    }

    pub fn with_config(config: SweepConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut SweepConfig {
        &mut self.config
    }

    /// Execute a CLI command
    pub async fn execute(&self, command: &Commands) -> Result<CommandOutput, SweepError> {
        match command {
            Commands::Scan { format, quiet } => {
                let format = parse_format(format, &["text", "json"])?;
                let scanner = Scanner::from_config(&self.config)?;
                self.execute_scan(scanner, format == "json" || *quiet, format)
                    .await
            }
            Commands::Config { format } => {
                let format = parse_format(format, &["toml", "json"])?;
                self.execute_config(format).map(CommandOutput::success)
            }
            Commands::Classify { record, format } => {
                let format = parse_format(format, &["text", "json"])?;
                self.execute_classify(record, format)
                    .map(CommandOutput::success)
            }
        }
    }

    /// Run one scan with `scanner`, optionally streaming entries to stdout.
    pub async fn execute_scan(
        &self,
        scanner: Scanner,
        quiet: bool,
        format: &str,
    ) -> Result<CommandOutput, SweepError> {
        for note in self.config.missing_settings() {
            warn!("{}", note);
        }

        let printer = if quiet {
            None
        } else {
            let mut receiver = scanner.subscribe();
            let color = stdout_supports_color();
            Some(tokio::spawn(async move {
                loop {
                    match receiver.recv().await {
                        Ok(entry) => println!("{}", format_entry_line(&entry, color)),
                        Err(RecvError::Lagged(skipped)) => {
                            warn!(skipped, "Log stream lagged; entries omitted from live output");
                        }
                        Err(RecvError::Closed) => break,
                    }
                }
            }))
        };

        let result = scanner.run_scan().await;
        // Dropping the scanner closes the stream so the printer drains and exits.
        drop(scanner);
        if let Some(printer) = printer {
            if let Err(e) = printer.await {
                warn!(error = %e, "Log printer task failed");
            }
        }

        let report = result?;
        info!(completed = report.is_completed(), "Scan command finished");
        render_report(&report, format)
    }

    fn execute_config(&self, format: &str) -> Result<String, SweepError> {
        let redacted = self.config.redacted();
        let missing = self.config.missing_settings();
        if format == "json" {
            let value = json!({ "config": redacted, "warnings": missing });
            return serde_json::to_string_pretty(&value)
                .map_err(|e| SweepError::Config(format!("Failed to render config: {}", e)));
        }

        let mut out = toml::to_string_pretty(&redacted)
            .map_err(|e| SweepError::Config(format!("Failed to render config: {}", e)))?;
        for note in missing {
            out.push_str(&format!("# warning: {}\n", note));
        }
        Ok(out)
    }

    fn execute_classify(&self, record: &str, format: &str) -> Result<String, SweepError> {
        let record: FileRecord = serde_json::from_str(record)
            .map_err(|e| SweepError::Config(format!("Invalid file record JSON: {}", e)))?;
        let classification = classify(&record, &self.config.rules);
        if format == "json" {
            let value = json!({
                "record": record,
                "clean": classification.is_clean(),
                "verdicts": classification.verdicts(),
            });
            return serde_json::to_string_pretty(&value)
                .map_err(|e| SweepError::Config(format!("Failed to render verdicts: {}", e)));
        }
        Ok(format_classification_text(&record, &classification))
    }
}

fn render_report(report: &ScanReport, format: &str) -> Result<CommandOutput, SweepError> {
    let body = if format == "json" {
        serde_json::to_string_pretty(report)
            .map_err(|e| SweepError::Config(format!("Failed to render scan report: {}", e)))?
    } else {
        format_scan_summary_text(report)
    };
    let exit_code = if report.is_completed() {
        0
    } else {
        EXIT_SCAN_FAILED
    };
    Ok(CommandOutput { body, exit_code })
}

fn parse_format<'a>(format: &'a str, allowed: &[&str]) -> Result<&'a str, SweepError> {
    if allowed.contains(&format) {
        Ok(format)
    } else {
        Err(SweepError::Config(format!(
            "Invalid format: {} (must be one of: {})",
            format,
            allowed.join(", ")
        )))
    }
}
