//! Release lifecycle trait.

use async_trait::async_trait;
use serde_json::Value;

use super::Plugin;
use crate::{Increment, PluginResult, ReleaseContext, ReleaseOptions};

/// Lifecycle hooks driven by the orchestrator during one release run.
///
/// Hooks fire in this order:
/// 1. `init`
/// 2. `get_name`, `get_latest_version`, `get_changelog`, `get_increment`
/// 3. `get_incremented_version_ci`, then `get_incremented_version`
/// 4. `before_bump`, `bump`
/// 5. `before_release`, `release`, `after_release`
///
/// Every hook is optional. Getters answer `Ok(None)` when they have nothing
/// to say, which lets the orchestrator fall back to the next source. Getters
/// only see a shared context, so asking them never changes run state.
#[async_trait]
pub trait ReleasePlugin: Plugin {
    /// One-time setup, before any other hook.
    ///
    /// # Errors
    ///
    /// Returns an error if the plugin cannot operate; the run is aborted.
    async fn init(&mut self, _ctx: &ReleaseContext) -> PluginResult<()> {
        Ok(())
    }

    /// Identifies the release subject (e.g. a package name).
    ///
    /// # Errors
    ///
    /// Returns an error if the name source exists but cannot be read.
    async fn get_name(&self, _ctx: &ReleaseContext) -> PluginResult<Option<String>> {
        Ok(None)
    }

    /// Returns the last published version.
    ///
    /// # Errors
    ///
    /// Returns an error if the version source exists but cannot be read.
    async fn get_latest_version(&self, _ctx: &ReleaseContext) -> PluginResult<Option<String>> {
        Ok(None)
    }

    /// Summarizes the changes since the latest version.
    ///
    /// # Errors
    ///
    /// Returns an error if the change history cannot be read.
    async fn get_changelog(&self, _ctx: &ReleaseContext) -> PluginResult<Option<String>> {
        Ok(None)
    }

    /// Overrides the increment to apply.
    ///
    /// # Errors
    ///
    /// Returns an error if the plugin's own increment setting is invalid.
    async fn get_increment(
        &self,
        _options: &ReleaseOptions,
        _ctx: &ReleaseContext,
    ) -> PluginResult<Option<Increment>> {
        Ok(None)
    }

    /// Resolves the next version without user interaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the options cannot produce a version.
    async fn get_incremented_version_ci(
        &self,
        _options: &ReleaseOptions,
        _ctx: &ReleaseContext,
    ) -> PluginResult<Option<String>> {
        Ok(None)
    }

    /// Resolves the next version, possibly interactively.
    ///
    /// # Errors
    ///
    /// Returns an error if the options cannot produce a version.
    async fn get_incremented_version(
        &self,
        _options: &ReleaseOptions,
        _ctx: &ReleaseContext,
    ) -> PluginResult<Option<String>> {
        Ok(None)
    }

    /// Reads a plugin-local context value.
    fn get_context(&self, _key: &str) -> Option<Value> {
        None
    }

    /// Called before the version is applied.
    ///
    /// # Errors
    ///
    /// Returns an error if pre-bump validation fails.
    async fn before_bump(&mut self, _ctx: &mut ReleaseContext) -> PluginResult<()> {
        Ok(())
    }

    /// Applies the version to every managed artifact.
    ///
    /// # Errors
    ///
    /// Returns an error if an artifact cannot be updated.
    async fn bump(&mut self, _version: &str, _ctx: &mut ReleaseContext) -> PluginResult<()> {
        Ok(())
    }

    /// Called before the release is published.
    ///
    /// # Errors
    ///
    /// Returns an error if pre-release steps fail (e.g. committing).
    async fn before_release(&mut self, _ctx: &mut ReleaseContext) -> PluginResult<()> {
        Ok(())
    }

    /// Publishes the release (tag, push, remote record).
    ///
    /// # Errors
    ///
    /// Returns an error if publishing fails.
    async fn release(&mut self, _ctx: &mut ReleaseContext) -> PluginResult<()> {
        Ok(())
    }

    /// Called after the release is published.
    ///
    /// # Errors
    ///
    /// Returns an error if post-release steps fail (e.g. notifications).
    async fn after_release(&mut self, _ctx: &mut ReleaseContext) -> PluginResult<()> {
        Ok(())
    }
}
