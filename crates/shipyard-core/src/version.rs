//! Version management.

use semver::{BuildMetadata, Prerelease, Version};
use serde_json::{Value, json};
use shipyard_plugin::{Increment, keys};

use crate::{CoreError, CoreResult};

/// Manages version operations.
///
/// Increments follow the node-semver rules: bumping a pre-release to its own
/// release line promotes it (`1.0.0-1` major is `1.0.0`), and the `pre*`
/// increments start or continue a numbered pre-release.
#[derive(Debug, Clone, Copy)]
pub struct VersionManager;

impl VersionManager {
    /// Creates a new version manager.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Parses a version string.
    ///
    /// # Errors
    ///
    /// Returns an error if the version string is invalid.
    pub fn parse(&self, version: &str) -> CoreResult<Version> {
        Version::parse(version).map_err(|source| CoreError::InvalidVersion {
            version: version.to_string(),
            source,
        })
    }

    /// Computes the version following `latest` for the given increment.
    ///
    /// `Skip` keeps `latest` unchanged and `Exact` replaces it without
    /// parsing it. Keywords require `latest` to be a valid version.
    ///
    /// # Errors
    ///
    /// Returns an error if `latest` is not a version or `pre_id` is not a
    /// valid pre-release identifier.
    pub fn next(
        &self,
        latest: &str,
        increment: &Increment,
        pre_id: Option<&str>,
    ) -> CoreResult<String> {
        match increment {
            Increment::Skip => Ok(latest.to_string()),
            Increment::Exact(version) => Ok(version.to_string()),
            keyword => {
                let current = self.parse(latest)?;
                Ok(self.bump(&current, keyword, pre_id)?.to_string())
            }
        }
    }

    /// Bumps a version according to the increment.
    ///
    /// # Errors
    ///
    /// Returns an error if `pre_id` is not a valid pre-release identifier,
    /// or if a version component would overflow.
    pub fn bump(
        &self,
        version: &Version,
        increment: &Increment,
        pre_id: Option<&str>,
    ) -> CoreResult<Version> {
        let mut next = version.clone();
        next.build = BuildMetadata::EMPTY;

        match increment {
            Increment::Major => {
                if next.pre.is_empty() || next.minor != 0 || next.patch != 0 {
                    next.major = step(next.major, "major")?;
                }
                next.minor = 0;
                next.patch = 0;
                next.pre = Prerelease::EMPTY;
            }
            Increment::Minor => {
                if next.pre.is_empty() || next.patch != 0 {
                    next.minor = step(next.minor, "minor")?;
                }
                next.patch = 0;
                next.pre = Prerelease::EMPTY;
            }
            Increment::Patch => {
                if next.pre.is_empty() {
                    next.patch = step(next.patch, "patch")?;
                }
                next.pre = Prerelease::EMPTY;
            }
            Increment::Premajor => {
                next.major = step(next.major, "major")?;
                next.minor = 0;
                next.patch = 0;
                next.pre = start_pre(pre_id)?;
            }
            Increment::Preminor => {
                next.minor = step(next.minor, "minor")?;
                next.patch = 0;
                next.pre = start_pre(pre_id)?;
            }
            Increment::Prepatch => {
                next.patch = step(next.patch, "patch")?;
                next.pre = start_pre(pre_id)?;
            }
            Increment::Prerelease => {
                if next.pre.is_empty() {
                    next.patch = step(next.patch, "patch")?;
                    next.pre = start_pre(pre_id)?;
                } else {
                    next.pre = continue_pre(&next.pre, pre_id)?;
                }
            }
            Increment::Exact(version) => return Ok(version.clone()),
            Increment::Skip => {}
        }

        Ok(next)
    }
}

impl Default for VersionManager {
    fn default() -> Self {
        Self::new()
    }
}

fn step(value: u64, component: &str) -> CoreResult<u64> {
    value
        .checked_add(1)
        .ok_or_else(|| CoreError::InvalidIncrement(format!("{component} version {value} overflows")))
}

fn start_pre(pre_id: Option<&str>) -> CoreResult<Prerelease> {
    let parts = match pre_id {
        Some(id) => vec![id.to_string(), "0".to_string()],
        None => vec!["0".to_string()],
    };
    make_pre(&parts)
}

fn continue_pre(current: &Prerelease, pre_id: Option<&str>) -> CoreResult<Prerelease> {
    let mut parts: Vec<String> = current.as_str().split('.').map(String::from).collect();

    match parts.iter().rposition(|part| is_numeric(part)) {
        Some(index) => {
            let value: u64 = parts[index].parse().map_err(|_| {
                CoreError::InvalidIncrement(format!("pre-release number `{}` overflows", parts[index]))
            })?;
            parts[index] = step(value, "pre-release")?.to_string();
        }
        None => parts.push("0".to_string()),
    }

    if let Some(id) = pre_id {
        let same_channel = parts.first().is_some_and(|first| first == id);
        let numbered = parts.get(1).is_some_and(|second| is_numeric(second));
        if !same_channel || !numbered {
            parts = vec![id.to_string(), "0".to_string()];
        }
    }

    make_pre(&parts)
}

fn make_pre(parts: &[String]) -> CoreResult<Prerelease> {
    let joined = parts.join(".");
    Prerelease::new(&joined)
        .map_err(|e| CoreError::InvalidIncrement(format!("pre-release `{joined}`: {e}")))
}

fn is_numeric(identifier: &str) -> bool {
    !identifier.is_empty() && identifier.bytes().all(|b| b.is_ascii_digit())
}

/// Splits a resolved version into the context entries hooks may read.
///
/// A value that is not a semantic version yields `version` and marks the
/// release as not a pre-release.
#[must_use]
pub fn version_parts(version: &str) -> Vec<(&'static str, Value)> {
    let mut parts = vec![(keys::VERSION, json!(version))];

    let Ok(parsed) = Version::parse(version) else {
        parts.extend([
            (keys::IS_PRE_RELEASE, json!(false)),
            (keys::PRE_RELEASE_ID, Value::Null),
        ]);
        return parts;
    };

    let pre_release_id = parsed
        .pre
        .as_str()
        .split('.')
        .next()
        .filter(|first| !first.is_empty() && !is_numeric(first))
        .map(String::from);

    parts.extend([
        (keys::MAJOR, json!(parsed.major)),
        (keys::MINOR, json!(parsed.minor)),
        (keys::PATCH, json!(parsed.patch)),
        (
            keys::PRERELEASE,
            non_empty(parsed.pre.as_str()).map_or(Value::Null, Value::from),
        ),
        (
            keys::BUILD,
            non_empty(parsed.build.as_str()).map_or(Value::Null, Value::from),
        ),
        (keys::IS_PRE_RELEASE, json!(!parsed.pre.is_empty())),
        (keys::PRE_RELEASE_ID, json!(pre_release_id)),
    ]);

    parts
}

fn non_empty(s: &str) -> Option<&str> {
    (!s.is_empty()).then_some(s)
}
