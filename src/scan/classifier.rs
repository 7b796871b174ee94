//! Heuristic file classifier
//!
//! Pure mapping from a [`FileRecord`] to the verdicts it triggers. Rules are
//! evaluated independently, so one record can match several of them.

use crate::error::SweepError;
use crate::types::{FileRecord, InstanceId};
use serde::{Deserialize, Serialize};

const KIB: f64 = 1024.0;
const MIB: f64 = 1024.0 * 1024.0;

/// Smallest legitimate `server.jar`, in bytes.
pub const DEFAULT_MIN_SERVER_JAR_BYTES: u64 = 18 * 1024 * 1024;

/// Classification rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierRules {
    /// `purpose` tags that mark a file as a script.
    #[serde(default = "default_script_purposes")]
    pub script_purposes: Vec<String>,

    /// Exact file names of known miner binaries.
    #[serde(default = "default_miner_names")]
    pub miner_names: Vec<String>,

    /// File name whose size is checked.
    #[serde(default = "default_server_jar_name")]
    pub server_jar_name: String,

    /// Jars strictly smaller than this are flagged.
    #[serde(default = "default_min_server_jar_bytes")]
    pub min_server_jar_bytes: u64,
}

fn default_script_purposes() -> Vec<String> {
    vec!["script".to_string()]
}

fn default_miner_names() -> Vec<String> {
    vec!["xmrig".to_string()]
}

fn default_server_jar_name() -> String {
    "server.jar".to_string()
}

fn default_min_server_jar_bytes() -> u64 {
    DEFAULT_MIN_SERVER_JAR_BYTES
}

impl Default for ClassifierRules {
    fn default() -> Self {
        Self {
            script_purposes: default_script_purposes(),
            miner_names: default_miner_names(),
            server_jar_name: default_server_jar_name(),
            min_server_jar_bytes: default_min_server_jar_bytes(),
        }
    }
}

/// Outcome of one rule for one record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Verdict {
    Clean,
    SuspiciousScript,
    SuspiciousMiner,
    SuspiciousJarSize { bytes: u64 },
    /// The size could not be parsed; classification of the record stops here.
    UnknownSizeFormat { size: String },
}

impl Verdict {
    /// Whether this verdict should suspend the instance.
    pub fn is_suspicious(&self) -> bool {
        matches!(
            self,
            Verdict::SuspiciousScript | Verdict::SuspiciousMiner | Verdict::SuspiciousJarSize { .. }
        )
    }

    /// Human-readable reason, `None` for clean records.
    pub fn reason(&self) -> Option<String> {
        match self {
            Verdict::Clean => None,
            Verdict::SuspiciousScript => Some("Suspicious .sh file detected".to_string()),
            Verdict::SuspiciousMiner => Some("Suspicious mining activity detected".to_string()),
            Verdict::SuspiciousJarSize { bytes } => Some(format!(
                "Suspicious server.jar file size detected ({} bytes)",
                bytes
            )),
            Verdict::UnknownSizeFormat { size } => Some(format!("Unknown size format: {}", size)),
        }
    }

    /// Scan-log line for a detection on instance `id`.
    ///
    /// Jar-size lines name only the instance; the byte count stays in
    /// [`Verdict::reason`].
    pub fn detection_line(&self, id: &InstanceId) -> Option<String> {
        match self {
            Verdict::SuspiciousJarSize { .. } => Some(format!(
                "Suspicious server.jar file size detected: {}",
                id
            )),
            Verdict::SuspiciousScript | Verdict::SuspiciousMiner => self
                .reason()
                .map(|reason| format!("{} in server: {}", reason, id)),
            Verdict::Clean | Verdict::UnknownSizeFormat { .. } => None,
        }
    }
}

/// Every verdict a record triggered, in rule order (script, miner, jar).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    verdicts: Vec<Verdict>,
}

impl Classification {
    pub fn is_clean(&self) -> bool {
        self.verdicts.is_empty()
    }

    /// First matching verdict, or `Clean`.
    pub fn primary(&self) -> Verdict {
        self.verdicts.first().cloned().unwrap_or(Verdict::Clean)
    }

    pub fn verdicts(&self) -> &[Verdict] {
        &self.verdicts
    }

    pub fn contains(&self, verdict: &Verdict) -> bool {
        self.verdicts.contains(verdict)
    }

    pub fn into_verdicts(self) -> Vec<Verdict> {
        self.verdicts
    }
}

/// Classify a single record.
///
/// An unparsable jar size yields `UnknownSizeFormat` as the final verdict; the
/// caller decides how much of the listing that abandons.
pub fn classify(record: &FileRecord, rules: &ClassifierRules) -> Classification {
    let mut verdicts = Vec::new();

    if rules.script_purposes.iter().any(|p| *p == record.purpose) {
        verdicts.push(Verdict::SuspiciousScript);
    }

    if rules.miner_names.iter().any(|n| *n == record.name) {
        verdicts.push(Verdict::SuspiciousMiner);
    }

    if record.name == rules.server_jar_name {
        match parse_size_bytes(&record.size) {
            Ok(bytes) if bytes < rules.min_server_jar_bytes as f64 => {
                verdicts.push(Verdict::SuspiciousJarSize {
                    bytes: bytes as u64,
                });
            }
            Ok(_) => {}
            Err(_) => verdicts.push(Verdict::UnknownSizeFormat {
                size: record.size.clone(),
            }),
        }
    }

    Classification { verdicts }
}

/// Convert a size such as `17MB`, `2000KB` or `512B` to bytes.
///
/// Suffixes are matched case-sensitively in the order `MB`, `KB`, `B`. Any other
/// suffix, or a number that does not parse, is an `UnknownSizeFormat`; `5GB`
/// therefore fails because `5G` is not a number.
pub fn parse_size_bytes(size: &str) -> Result<f64, SweepError> {
    let trimmed = size.trim();
    let (number, multiplier) = if let Some(n) = trimmed.strip_suffix("MB") {
        (n, MIB)
    } else if let Some(n) = trimmed.strip_suffix("KB") {
        (n, KIB)
    } else if let Some(n) = trimmed.strip_suffix('B') {
        (n, 1.0)
    } else {
        return Err(SweepError::UnknownSizeFormat(size.to_string()));
    };

    number
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value >= 0.0)
        .map(|value| value * multiplier)
        .ok_or_else(|| SweepError::UnknownSizeFormat(size.to_string()))
}
