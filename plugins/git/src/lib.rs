//! Git plugin for Shipyard.
//!
//! Reads the latest version tag and the commits since it, then records the
//! release as a commit and an annotated tag. Nothing is pushed.

use std::path::PathBuf;

use async_trait::async_trait;
use shipyard_config::GitPluginConfig;
use shipyard_git::{GitError, Repository, VersionTag};
use shipyard_plugin::{Plugin, PluginError, PluginResult, ReleaseContext, ReleasePlugin, keys};
use tracing::{debug, info};

/// Reads release history from git and records new releases.
pub struct GitPlugin {
    root: PathBuf,
    config: GitPluginConfig,
    name: Option<String>,
    latest_tag: Option<VersionTag>,
    changelog: Option<String>,
}

impl GitPlugin {
    /// Creates a plugin for the repository containing `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, config: GitPluginConfig) -> Self {
        Self {
            root: root.into(),
            config,
            name: None,
            latest_tag: None,
            changelog: None,
        }
    }

    /// Returns the tag name template.
    #[must_use]
    pub fn tag_template(&self) -> String {
        self.config
            .tag_name
            .clone()
            .unwrap_or_else(|| format!("{}${{version}}", self.config.tag_prefix))
    }

    // git2 handles are not Sync, so each hook opens its own
    fn open(&self) -> PluginResult<Repository> {
        Repository::discover_from(&self.root).map_err(git_failed)
    }
}

fn git_failed(err: GitError) -> PluginError {
    PluginError::ExecutionFailed(err.to_string())
}

impl Plugin for GitPlugin {
    fn name(&self) -> &'static str {
        "git"
    }

    fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    fn description(&self) -> &'static str {
        "Reads version tags and commits, then commits and tags the release"
    }
}

#[async_trait]
impl ReleasePlugin for GitPlugin {
    async fn init(&mut self, _ctx: &ReleaseContext) -> PluginResult<()> {
        let repo = Repository::discover_from(&self.root)
            .map_err(|e| PluginError::InitFailed(e.to_string()))?;

        if self.config.require_clean && !repo.is_clean().map_err(git_failed)? {
            return Err(PluginError::InitFailed(GitError::Dirty.to_string()));
        }

        self.name = repo.name();
        self.latest_tag = repo
            .latest_version_tag(&self.config.tag_prefix)
            .map_err(git_failed)?;

        let since = self.latest_tag.as_ref().map(|tag| tag.name.as_str());
        let commits = repo.commits_since(since).map_err(git_failed)?;
        self.changelog = (!commits.is_empty()).then(|| {
            commits
                .iter()
                .map(|c| format!("* {} ({})", c.subject(), c.short_hash()))
                .collect::<Vec<_>>()
                .join("\n")
        });

        debug!(
            latest_tag = ?self.latest_tag.as_ref().map(|t| &t.name),
            commits = commits.len(),
            "read git history"
        );
        Ok(())
    }

    async fn get_name(&self, _ctx: &ReleaseContext) -> PluginResult<Option<String>> {
        Ok(self.name.clone())
    }

    async fn get_latest_version(&self, _ctx: &ReleaseContext) -> PluginResult<Option<String>> {
        Ok(self.latest_tag.as_ref().map(|tag| tag.version.to_string()))
    }

    async fn get_changelog(&self, _ctx: &ReleaseContext) -> PluginResult<Option<String>> {
        Ok(self.changelog.clone())
    }

    async fn before_bump(&mut self, ctx: &mut ReleaseContext) -> PluginResult<()> {
        if let Some(tag) = &self.latest_tag {
            ctx.set(keys::LATEST_TAG, tag.name.as_str());
        }
        Ok(())
    }

    async fn bump(&mut self, _version: &str, ctx: &mut ReleaseContext) -> PluginResult<()> {
        if !ctx.is_set(keys::TAG_NAME) {
            let tag_name = ctx.render(&self.tag_template());
            debug!(tag = %tag_name, "rendered tag name");
            ctx.set(keys::TAG_NAME, tag_name);
        }
        Ok(())
    }

    async fn before_release(&mut self, ctx: &mut ReleaseContext) -> PluginResult<()> {
        if !self.config.commit {
            return Ok(());
        }

        let message = ctx.render(&self.config.commit_message);
        if ctx.dry_run {
            info!(%message, "dry run: would commit release");
            return Ok(());
        }

        match self.open()?.commit_all(&message).map_err(git_failed)? {
            Some(oid) => info!(%oid, %message, "committed release"),
            None => debug!("nothing to commit"),
        }
        Ok(())
    }

    async fn release(&mut self, ctx: &mut ReleaseContext) -> PluginResult<()> {
        if !self.config.tag {
            return Ok(());
        }

        let Some(tag_name) = ctx.get_str(keys::TAG_NAME).map(String::from) else {
            return Err(PluginError::ExecutionFailed("no tag name".to_string()));
        };
        let annotation = ctx.render(&self.config.tag_annotation);
        if ctx.dry_run {
            info!(tag = %tag_name, "dry run: would create tag");
            return Ok(());
        }

        self.open()?
            .create_tag(&tag_name, &annotation)
            .map_err(git_failed)?;
        info!(tag = %tag_name, "created tag");
        Ok(())
    }
}
