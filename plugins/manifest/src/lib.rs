//! Manifest plugin for Shipyard.
//!
//! Supplies the package name and latest version from the first configured
//! manifest, and writes the released version to every manifest on bump.

mod error;
mod manifest;

use std::path::PathBuf;

use async_trait::async_trait;
use shipyard_plugin::{Plugin, PluginResult, ReleaseContext, ReleasePlugin};
use tracing::{debug, info};

pub use error::{ManifestError, ManifestResult};
pub use manifest::{Manifest, ManifestKind, PackageInfo};

/// Manifest files probed when none are configured.
pub const DEFAULT_MANIFESTS: [&str; 2] = ["Cargo.toml", "package.json"];

/// Keeps `Cargo.toml` and `package.json` versions in step with releases.
pub struct ManifestPlugin {
    root: PathBuf,
    files: Vec<String>,
    manifests: Vec<Manifest>,
    primary: PackageInfo,
}

impl ManifestPlugin {
    /// Creates a plugin for `files`, relative to `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, files: Vec<String>) -> Self {
        Self {
            root: root.into(),
            files,
            manifests: Vec::new(),
            primary: PackageInfo::default(),
        }
    }

    /// Returns the manifest files found in `root` among the defaults.
    #[must_use]
    pub fn detect(root: impl Into<PathBuf>) -> Vec<String> {
        let root = root.into();
        DEFAULT_MANIFESTS
            .iter()
            .filter(|name| root.join(name).is_file())
            .map(|name| (*name).to_string())
            .collect()
    }

    /// Returns the manifests loaded by `init`.
    #[must_use]
    pub fn manifests(&self) -> &[Manifest] {
        &self.manifests
    }
}

impl Plugin for ManifestPlugin {
    fn name(&self) -> &'static str {
        "manifest"
    }

    fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    fn description(&self) -> &'static str {
        "Reads and bumps versions in Cargo.toml and package.json"
    }
}

#[async_trait]
impl ReleasePlugin for ManifestPlugin {
    async fn init(&mut self, _ctx: &ReleaseContext) -> PluginResult<()> {
        self.manifests = self
            .files
            .iter()
            .map(|file| Manifest::open(self.root.join(file)))
            .collect::<ManifestResult<_>>()?;

        if let Some(first) = self.manifests.first() {
            self.primary = first.read()?;
            debug!(
                path = %first.path().display(),
                name = ?self.primary.name,
                version = ?self.primary.version,
                "read primary manifest"
            );
        }
        Ok(())
    }

    async fn get_name(&self, _ctx: &ReleaseContext) -> PluginResult<Option<String>> {
        Ok(self.primary.name.clone())
    }

    async fn get_latest_version(&self, _ctx: &ReleaseContext) -> PluginResult<Option<String>> {
        Ok(self.primary.version.clone())
    }

    async fn bump(&mut self, version: &str, ctx: &mut ReleaseContext) -> PluginResult<()> {
        for manifest in &self.manifests {
            if ctx.dry_run {
                info!(path = %manifest.path().display(), %version, "dry run: would bump manifest");
                continue;
            }
            manifest.write_version(version)?;
            info!(path = %manifest.path().display(), %version, "bumped manifest");
        }
        Ok(())
    }
}
