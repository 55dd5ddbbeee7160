//! Increment directives.

use std::fmt;
use std::str::FromStr;

use semver::Version;
use serde_json::Value;

use crate::{PluginError, PluginResult};

/// How to advance a version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Increment {
    /// `1.2.3` -> `2.0.0`.
    Major,
    /// `1.2.3` -> `1.3.0`.
    Minor,
    /// `1.2.3` -> `1.2.4`.
    Patch,
    /// `1.2.3` -> `2.0.0-0`.
    Premajor,
    /// `1.2.3` -> `1.3.0-0`.
    Preminor,
    /// `1.2.3` -> `1.2.4-0`.
    Prepatch,
    /// `1.2.4-0` -> `1.2.4-1`.
    Prerelease,
    /// Release exactly this version.
    Exact(Version),
    /// Keep the latest version as is.
    Skip,
}

impl Increment {
    /// Returns true for the `pre*` keywords.
    #[must_use]
    pub fn is_pre(&self) -> bool {
        matches!(
            self,
            Self::Premajor | Self::Preminor | Self::Prepatch | Self::Prerelease
        )
    }

    /// Returns the pre-release variant of a plain keyword.
    ///
    /// `major` becomes `premajor` and so on; every other directive is
    /// returned unchanged.
    #[must_use]
    pub fn to_pre(&self) -> Self {
        match self {
            Self::Major => Self::Premajor,
            Self::Minor => Self::Preminor,
            Self::Patch => Self::Prepatch,
            other => other.clone(),
        }
    }

    /// Reads an increment from a context value.
    ///
    /// `false` means [`Increment::Skip`]. `null`, `true` and the empty string
    /// carry no directive and yield `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is neither a recognized keyword nor a
    /// semantic version.
    pub fn from_value(value: &Value) -> PluginResult<Option<Self>> {
        match value {
            Value::Null | Value::Bool(true) => Ok(None),
            Value::Bool(false) => Ok(Some(Self::Skip)),
            Value::String(s) if s.trim().is_empty() => Ok(None),
            Value::String(s) => s.parse().map(Some),
            other => Err(PluginError::InvalidIncrement(other.to_string())),
        }
    }

    /// Converts the increment into its context representation.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Skip => Value::Bool(false),
            other => Value::String(other.to_string()),
        }
    }
}

impl FromStr for Increment {
    type Err = PluginError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s {
            "major" => Ok(Self::Major),
            "minor" => Ok(Self::Minor),
            "patch" => Ok(Self::Patch),
            "premajor" => Ok(Self::Premajor),
            "preminor" => Ok(Self::Preminor),
            "prepatch" => Ok(Self::Prepatch),
            "prerelease" => Ok(Self::Prerelease),
            "false" => Ok(Self::Skip),
            _ => Version::parse(s.strip_prefix('v').unwrap_or(s))
                .map(Self::Exact)
                .map_err(|_| PluginError::InvalidIncrement(s.to_string())),
        }
    }
}

impl fmt::Display for Increment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Major => write!(f, "major"),
            Self::Minor => write!(f, "minor"),
            Self::Patch => write!(f, "patch"),
            Self::Premajor => write!(f, "premajor"),
            Self::Preminor => write!(f, "preminor"),
            Self::Prepatch => write!(f, "prepatch"),
            Self::Prerelease => write!(f, "prerelease"),
            Self::Exact(version) => write!(f, "{version}"),
            Self::Skip => write!(f, "false"),
        }
    }
}
