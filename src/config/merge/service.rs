//! MergeService: orchestrates sources and deserializes to SweepConfig.

use crate::config::sources::{environment, global_file, local_file};
use crate::config::SweepConfig;
use crate::error::SweepError;
use config::Config;
use std::path::Path;

/// Merge service for config composition.
pub struct MergeService;

impl MergeService {
    /// Load config from standard sources.
    /// Precedence: global file (lowest) -> local file -> environment (highest).
    pub fn load() -> Result<SweepConfig, SweepError> {
        let builder = Config::builder();
        let builder = global_file::add_to_builder(builder)?;
        let builder = local_file::add_to_builder(builder)?;
        let builder = environment::add_to_builder(builder)?;

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Load config from a specific file with environment overlay.
    pub fn load_from_file(path: &Path) -> Result<SweepConfig, SweepError> {
        let builder = Config::builder();
        let builder = local_file::add_path_to_builder(builder, path)?;
        let builder = environment::add_to_builder(builder)?;

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }
}
