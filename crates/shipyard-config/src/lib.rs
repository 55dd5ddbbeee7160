//! Configuration management for Shipyard.
//!
//! Loads the `shipyard.toml` file, merges command-line overrides and
//! exposes the values the release run is seeded with.

mod error;
mod loader;
mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{
    CONFIG_FILE_NAME, find_config_from, load_config, load_or_default_from, write_config,
};
pub use schema::{
    ChangelogPluginConfig, Config, ConfigOverrides, GitPluginConfig, IncrementSetting,
    ManifestPluginConfig, PluginsConfig, PreReleaseSetting, ReleaseConfig,
};
