//! Configuration schema.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, ConfigResult};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Release run configuration.
    #[serde(default)]
    pub release: ReleaseConfig,

    /// Values seeded into the release context before a run.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub context: BTreeMap<String, toml::Value>,

    /// Plugin-specific configuration.
    #[serde(default)]
    pub plugins: PluginsConfig,
}

impl Config {
    /// Applies command-line or environment overrides on top of file values.
    #[must_use]
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(name) = overrides.name {
            self.release.name = Some(name);
        }
        if let Some(increment) = overrides.increment {
            self.release.increment = Some(increment);
        }
        if let Some(pre_release) = overrides.pre_release {
            self.release.pre_release = Some(pre_release);
        }
        self.release.ci |= overrides.ci;
        self.release.dry_run |= overrides.dry_run;
        self
    }

    /// Returns the `[context]` table as JSON values.
    ///
    /// # Errors
    ///
    /// Returns an error if a value cannot be represented as JSON.
    pub fn context_values(&self) -> ConfigResult<Vec<(String, serde_json::Value)>> {
        self.context
            .iter()
            .map(|(key, value)| {
                serde_json::to_value(value)
                    .map(|json| (key.clone(), json))
                    .map_err(|e| ConfigError::Invalid(format!("context.{key}: {e}")))
            })
            .collect()
    }
}

/// Release run configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReleaseConfig {
    /// Name used when no plugin supplies one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Increment directive (keyword, exact version, or `false`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub increment: Option<IncrementSetting>,

    /// Pre-release mode (`true` or a channel identifier).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_release: Option<PreReleaseSetting>,

    /// Run unattended.
    #[serde(default)]
    pub ci: bool,

    /// Report what would happen without changing anything.
    #[serde(default)]
    pub dry_run: bool,
}

/// Increment directive as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IncrementSetting {
    /// `false` disables incrementing; `true` carries no directive.
    Flag(bool),
    /// A keyword such as `minor`, or an exact version.
    Directive(String),
}

impl IncrementSetting {
    /// Returns the context representation of the setting.
    #[must_use]
    pub fn to_value(&self) -> serde_json::Value {
        match self {
            Self::Flag(flag) => serde_json::Value::Bool(*flag),
            Self::Directive(directive) => serde_json::Value::String(directive.clone()),
        }
    }
}

impl From<&str> for IncrementSetting {
    fn from(value: &str) -> Self {
        match value {
            "false" => Self::Flag(false),
            "true" => Self::Flag(true),
            other => Self::Directive(other.to_string()),
        }
    }
}

/// Pre-release mode as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PreReleaseSetting {
    /// Plain on/off switch.
    Flag(bool),
    /// Channel identifier such as `beta`.
    Id(String),
}

impl PreReleaseSetting {
    /// Returns true if pre-release mode is on.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        match self {
            Self::Flag(flag) => *flag,
            Self::Id(id) => !id.is_empty(),
        }
    }

    /// Returns the channel identifier, if one was given.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Id(id) if !id.is_empty() => Some(id),
            _ => None,
        }
    }
}

/// Overrides collected from the command line or environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Overrides `release.name`.
    pub name: Option<String>,
    /// Overrides `release.increment`.
    pub increment: Option<IncrementSetting>,
    /// Overrides `release.pre_release`.
    pub pre_release: Option<PreReleaseSetting>,
    /// Forces unattended mode.
    pub ci: bool,
    /// Forces a dry run.
    pub dry_run: bool,
}

/// Plugin-specific configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PluginsConfig {
    /// Manifest plugin configuration.
    #[serde(default)]
    pub manifest: ManifestPluginConfig,

    /// Changelog plugin configuration.
    #[serde(default)]
    pub changelog: ChangelogPluginConfig,

    /// Git plugin configuration.
    #[serde(default)]
    pub git: GitPluginConfig,
}

/// Manifest plugin configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManifestPluginConfig {
    /// Manifest files holding the version (`Cargo.toml`, `package.json`).
    #[serde(default)]
    pub files: Vec<String>,
}

/// Changelog plugin configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangelogPluginConfig {
    /// Write changelog entries.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Output file path.
    #[serde(default = "default_changelog_output")]
    pub output: String,
}

impl Default for ChangelogPluginConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            output: default_changelog_output(),
        }
    }
}

fn default_changelog_output() -> String {
    "CHANGELOG.md".to_string()
}

/// Git plugin configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitPluginConfig {
    /// Enable the git plugin.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Prefix of version tags (e.g. `v`).
    #[serde(default = "default_tag_prefix")]
    pub tag_prefix: String,

    /// Tag name template; defaults to the prefix followed by the version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_name: Option<String>,

    /// Create a tag on release.
    #[serde(default = "default_true")]
    pub tag: bool,

    /// Tag annotation template.
    #[serde(default = "default_tag_annotation")]
    pub tag_annotation: String,

    /// Commit all changes before tagging.
    #[serde(default = "default_true")]
    pub commit: bool,

    /// Commit message template.
    #[serde(default = "default_commit_message")]
    pub commit_message: String,

    /// Refuse to release from a dirty working tree.
    #[serde(default)]
    pub require_clean: bool,
}

impl Default for GitPluginConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tag_prefix: default_tag_prefix(),
            tag_name: None,
            tag: true,
            tag_annotation: default_tag_annotation(),
            commit: true,
            commit_message: default_commit_message(),
            require_clean: false,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_tag_prefix() -> String {
    "v".to_string()
}

fn default_tag_annotation() -> String {
    "Release ${version}".to_string()
}

fn default_commit_message() -> String {
    "chore: release v${version}".to_string()
}
