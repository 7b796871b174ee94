//! Per-user config file in the platform config directory.

use config::builder::DefaultState;
use config::{ConfigBuilder, File};
use std::path::PathBuf;

use crate::error::SweepError;

/// Base path (without extension) of the global config file, e.g.
/// `~/.config/fleetsweep/config`. Any format the `config` crate knows is accepted.
pub fn global_config_base() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "fleetsweep", "fleetsweep")
        .map(|dirs| dirs.config_dir().join("config"))
}

pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, SweepError> {
    let Some(base) = global_config_base() else {
        return Ok(builder);
    };
    let base = base.to_str().ok_or_else(|| {
        SweepError::Config(format!("Global config path is not valid UTF-8: {:?}", base))
    })?;
    Ok(builder.add_source(File::with_name(base).required(false)))
}
