//! Changelog plugin for Shipyard.
//!
//! On bump, prepends a `## [version] - date` section holding the run's
//! changelog to a [Keep a Changelog](https://keepachangelog.com/) file.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use shipyard_plugin::{Plugin, PluginResult, ReleaseContext, ReleasePlugin, keys};
use tracing::{debug, info};

/// Header written to a new changelog file.
pub const HEADER: &str = "# Changelog\n\n\
    All notable changes to this project will be documented in this file.\n\n\
    The format is based on [Keep a Changelog](https://keepachangelog.com/en/1.1.0/),\n\
    and this project adheres to [Semantic Versioning](https://semver.org/spec/v2.0.0.html).\n";

/// Keeps a changelog file up to date.
pub struct ChangelogPlugin {
    path: PathBuf,
    date: Option<NaiveDate>,
}

impl ChangelogPlugin {
    /// Creates a plugin writing to `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            date: None,
        }
    }

    /// Pins the release date instead of using today.
    #[must_use]
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Returns the changelog path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Formats the section for one release.
    #[must_use]
    pub fn entry(&self, version: &str, changes: &str) -> String {
        let date = self.date.unwrap_or_else(|| Local::now().date_naive());
        let mut entry = String::new();
        _ = writeln!(entry, "## [{version}] - {}\n", date.format("%Y-%m-%d"));
        _ = writeln!(entry, "{}\n", changes.trim_end());
        entry
    }

    /// Inserts `entry` above the newest release of `existing`.
    #[must_use]
    pub fn insert(existing: &str, entry: &str) -> String {
        if existing.trim().is_empty() {
            format!("{HEADER}\n{entry}")
        } else if existing.starts_with("## ") {
            format!("{entry}{existing}")
        } else if let Some(pos) = existing.find("\n## ") {
            let (header, rest) = existing.split_at(pos + 1);
            format!("{header}{entry}{rest}")
        } else {
            let separator = if existing.ends_with("\n\n") {
                ""
            } else if existing.ends_with('\n') {
                "\n"
            } else {
                "\n\n"
            };
            format!("{existing}{separator}{entry}")
        }
    }
}

impl Plugin for ChangelogPlugin {
    fn name(&self) -> &'static str {
        "changelog"
    }

    fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    fn description(&self) -> &'static str {
        "Prepends release notes to a Keep a Changelog file"
    }
}

#[async_trait]
impl ReleasePlugin for ChangelogPlugin {
    async fn bump(&mut self, version: &str, ctx: &mut ReleaseContext) -> PluginResult<()> {
        let Some(changes) = ctx.get_str(keys::CHANGELOG).filter(|c| !c.trim().is_empty()) else {
            debug!("no changelog for this release");
            return Ok(());
        };

        let entry = self.entry(version, changes);
        if ctx.dry_run {
            info!(path = %self.path.display(), %version, "dry run: would update changelog");
            return Ok(());
        }

        let existing = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };
        fs::write(&self.path, Self::insert(&existing, &entry))?;

        info!(path = %self.path.display(), %version, "updated changelog");
        Ok(())
    }
}
