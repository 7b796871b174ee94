//! `fleetsweep.{toml,json}` in the working directory, or an explicit file.

use config::builder::DefaultState;
use config::{ConfigBuilder, File};
use std::path::Path;

use crate::error::SweepError;

const LOCAL_CONFIG_NAME: &str = "fleetsweep";

pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, SweepError> {
    Ok(builder.add_source(File::with_name(LOCAL_CONFIG_NAME).required(false)))
}

/// Add a file the operator asked for explicitly; it must exist.
pub fn add_path_to_builder(
    builder: ConfigBuilder<DefaultState>,
    path: &Path,
) -> Result<ConfigBuilder<DefaultState>, SweepError> {
    if !path.is_file() {
        return Err(SweepError::Config(format!(
            "Config file not found: {}",
            path.display()
        )));
    }
    Ok(builder.add_source(File::from(path).required(true)))
}
