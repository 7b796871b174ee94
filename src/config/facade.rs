//! ConfigLoader facade delegating to merge service.

use super::merge::service::MergeService;
use super::SweepConfig;
use crate::error::SweepError;
use std::path::{Path, PathBuf};

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load from the standard file locations and the environment.
    pub fn load() -> Result<SweepConfig, SweepError> {
        MergeService::load()
    }

    /// Load from a specific file with environment overlay.
    pub fn load_from_file(path: &Path) -> Result<SweepConfig, SweepError> {
        MergeService::load_from_file(path)
    }

    /// Explicit path when given, standard locations otherwise.
    pub fn resolve(path: Option<&PathBuf>) -> Result<SweepConfig, SweepError> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Self::load(),
        }
    }

    /// Create default configuration.
    pub fn default() -> SweepConfig {
        SweepConfig::default()
    }
}
