//! Environment variable source: FLEETSWEEP_ prefix with __ separator

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::Environment;

use crate::error::SweepError;

/// Add environment variable overlay to builder.
/// Uses FLEETSWEEP prefix and __ as separator for nested keys.
///
/// Values stay strings here; keys such as `0123` must not be coerced to numbers.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, SweepError> {
    Ok(builder.add_source(Environment::with_prefix("FLEETSWEEP").separator("__")))
}
