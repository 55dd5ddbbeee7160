//! Manifest files holding a package name and version.
//!
//! Versions are rewritten in place with a regular expression so the rest of
//! the file keeps its formatting, key order and comments. In `package.json`
//! only the top-level `version` key is touched.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::{ManifestError, ManifestResult};

static TOML_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^(\s*version\s*=\s*)"([^"]*)""#).expect("invalid regex")
});

static TOML_PACKAGE_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*\[package\]\s*$").expect("invalid regex"));

static TOML_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*\[").expect("invalid regex"));

static JSON_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"("version"\s*:\s*)"([^"]*)""#).expect("invalid regex")
});

/// Supported manifest formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestKind {
    /// `Cargo.toml`.
    Cargo,
    /// `package.json`.
    Npm,
}

impl ManifestKind {
    /// Detects the format from the file name, then the extension.
    #[must_use]
    pub fn detect(path: &Path) -> Option<Self> {
        match path.file_name().and_then(|n| n.to_str()) {
            Some("Cargo.toml") => Some(Self::Cargo),
            Some("package.json") => Some(Self::Npm),
            _ => match path.extension().and_then(|e| e.to_str()) {
                Some("toml") => Some(Self::Cargo),
                Some("json") => Some(Self::Npm),
                _ => None,
            },
        }
    }
}

/// Name and version read from a manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageInfo {
    /// Package name.
    pub name: Option<String>,
    /// Package version.
    pub version: Option<String>,
}

/// A manifest file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    path: PathBuf,
    kind: ManifestKind,
}

impl Manifest {
    /// Opens a manifest, detecting its format.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or has an unknown format.
    pub fn open(path: impl Into<PathBuf>) -> ManifestResult<Self> {
        let path = path.into();
        if !path.is_file() {
            return Err(ManifestError::NotFound(path));
        }
        let kind = ManifestKind::detect(&path).ok_or_else(|| ManifestError::Unsupported(path.clone()))?;
        Ok(Self { path, kind })
    }

    /// Returns the file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the manifest format.
    #[must_use]
    pub fn kind(&self) -> ManifestKind {
        self.kind
    }

    /// Reads the package name and version.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn read(&self) -> ManifestResult<PackageInfo> {
        let content = fs::read_to_string(&self.path)?;
        match self.kind {
            ManifestKind::Cargo => self.read_cargo(&content),
            ManifestKind::Npm => self.read_npm(&content),
        }
    }

    /// Replaces the version and writes the file back.
    ///
    /// # Errors
    ///
    /// Returns an error if the file has no literal version or cannot be
    /// written.
    pub fn write_version(&self, version: &str) -> ManifestResult<()> {
        let content = fs::read_to_string(&self.path)?;
        let updated = self.with_version(&content, version)?;
        fs::write(&self.path, updated)?;
        Ok(())
    }

    /// Returns `content` with its version replaced.
    ///
    /// # Errors
    ///
    /// Returns an error if the content has no literal version.
    pub fn with_version(&self, content: &str, version: &str) -> ManifestResult<String> {
        match self.kind {
            ManifestKind::Cargo => {
                let (start, end) = package_section(content)
                    .ok_or_else(|| ManifestError::VersionNotFound(self.path.clone()))?;
                let section = &content[start..end];
                if !TOML_VERSION.is_match(section) {
                    return Err(ManifestError::VersionNotFound(self.path.clone()));
                }
                let replaced = TOML_VERSION.replace(section, format!(r#"${{1}}"{version}""#));
                Ok(format!("{}{replaced}{}", &content[..start], &content[end..]))
            }
            ManifestKind::Npm => {
                self.read_npm(content)?
                    .version
                    .ok_or_else(|| ManifestError::VersionNotFound(self.path.clone()))?;
                let value = JSON_VERSION
                    .captures_iter(content)
                    .find(|caps| {
                        caps.get(0)
                            .is_some_and(|m| json_depth(&content[..m.start()]) == Some(1))
                    })
                    .and_then(|caps| caps.get(2))
                    .ok_or_else(|| ManifestError::VersionNotFound(self.path.clone()))?;
                Ok(format!(
                    "{}{version}{}",
                    &content[..value.start()],
                    &content[value.end()..]
                ))
            }
        }
    }

    fn read_cargo(&self, content: &str) -> ManifestResult<PackageInfo> {
        let table: toml::Table = toml::from_str(content).map_err(|e| ManifestError::Parse {
            file: self.path.clone(),
            reason: e.to_string(),
        })?;

        let package = table.get("package").and_then(toml::Value::as_table);
        let field = |key: &str| {
            package
                .and_then(|p| p.get(key))
                .and_then(toml::Value::as_str)
                .map(String::from)
        };

        Ok(PackageInfo {
            name: field("name"),
            version: field("version"),
        })
    }

    fn read_npm(&self, content: &str) -> ManifestResult<PackageInfo> {
        let json: serde_json::Value =
            serde_json::from_str(content).map_err(|e| ManifestError::Parse {
                file: self.path.clone(),
                reason: e.to_string(),
            })?;

        let object = json.as_object().ok_or_else(|| ManifestError::Parse {
            file: self.path.clone(),
            reason: "not a JSON object".to_string(),
        })?;
        let field = |key: &str| object.get(key).and_then(|v| v.as_str()).map(String::from);

        Ok(PackageInfo {
            name: field("name"),
            version: field("version"),
        })
    }
}

/// Nesting depth at the end of `prefix`, or `None` inside a string literal.
fn json_depth(prefix: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for byte in prefix.bytes() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
        } else {
            match byte {
                b'"' => in_string = true,
                b'{' | b'[' => depth += 1,
                b'}' | b']' => depth = depth.saturating_sub(1),
                _ => {}
            }
        }
    }

    (!in_string).then_some(depth)
}

/// Byte range of the `[package]` table body.
fn package_section(content: &str) -> Option<(usize, usize)> {
    let start = TOML_PACKAGE_HEADER.find(content)?.end();
    let end = TOML_HEADER
        .find(&content[start..])
        .map_or(content.len(), |m| start + m.start());
    Some((start, end))
}
