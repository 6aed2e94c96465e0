use anyhow::Context;
use dres_domain::{CliOverrides, Config};

/// Load and validate the configuration. Runs before logging is set up, so
/// failures are reported through the returned error only.
pub fn load_config(path: Option<&str>, overrides: CliOverrides) -> anyhow::Result<Config> {
    let config = Config::load(path, overrides).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    Ok(config)
}
