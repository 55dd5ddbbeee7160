//! Configuration loader.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::{Config, ConfigError, ConfigResult};

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "shipyard.toml";

/// Loads configuration from the given path.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<Config> {
    let path = path.as_ref();
    debug!(?path, "loading configuration");

    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;

    Ok(config)
}

/// Looks for a configuration file in `start_dir` and its parents.
#[must_use]
pub fn find_config_from(start_dir: impl AsRef<Path>) -> Option<PathBuf> {
    start_dir
        .as_ref()
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find(|candidate| candidate.is_file())
}

/// Loads the nearest configuration file, or defaults when there is none.
///
/// Also returns the path the configuration came from.
///
/// # Errors
///
/// Returns an error if a configuration file exists but cannot be parsed.
pub fn load_or_default_from(start_dir: impl AsRef<Path>) -> ConfigResult<(Config, Option<PathBuf>)> {
    match find_config_from(start_dir) {
        Some(path) => {
            let config = load_config(&path)?;
            Ok((config, Some(path)))
        }
        None => {
            debug!("no configuration file found, using defaults");
            Ok((Config::default(), None))
        }
    }
}

/// Writes configuration to `path`.
///
/// Refuses to replace an existing file unless `force` is set.
///
/// # Errors
///
/// Returns an error if the file exists without `force`, or cannot be written.
pub fn write_config(path: impl AsRef<Path>, config: &Config, force: bool) -> ConfigResult<()> {
    let path = path.as_ref();
    if path.exists() && !force {
        return Err(ConfigError::AlreadyExists(path.to_path_buf()));
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    info!(?path, "wrote configuration");

    Ok(())
}
