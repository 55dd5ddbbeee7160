//! Release run orchestration.

use serde::Serialize;
use serde_json::Value;
use shipyard_config::{Config, PreReleaseSetting};
use shipyard_plugin::{
    Increment, PluginError, ReleaseContext, ReleaseOptions, ReleasePlugin, keys,
};
use tracing::{debug, info, warn};

use crate::version::version_parts;
use crate::{Cascade, CoreError, CoreResult, RunState, StateTracker, VersionManager};

/// Latest version assumed when no plugin knows one.
pub const DEFAULT_LATEST_VERSION: &str = "1.0.0";

/// Outcome of a completed release run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    /// Name of the released subject.
    pub name: String,
    /// Version the run started from.
    pub latest_version: String,
    /// Version that was released.
    pub version: String,
    /// Tag name settled for the release.
    pub tag_name: String,
    /// States the run went through.
    pub states: Vec<RunState>,
}

/// Drives one plugin through a release run.
///
/// The run calls the plugin hooks in a fixed order and writes each resolved
/// value into the context before moving on, so later hooks see earlier
/// results:
///
/// 1. `init`
/// 2. name, latest version, changelog, increment
/// 3. next version, decomposed into the context
/// 4. `before_bump`, `bump`, tag name
/// 5. `before_release`, `release`, `after_release`
///
/// The first failing hook stops the run. Nothing is rolled back.
#[derive(Debug, Clone, Default)]
pub struct Orchestrator {
    default_name: Option<String>,
    pre_release: Option<PreReleaseSetting>,
    versions: VersionManager,
}

impl Orchestrator {
    /// Creates an orchestrator with no default name and pre-release off.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an orchestrator from the `[release]` section.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            default_name: config.release.name.clone(),
            pre_release: config.release.pre_release.clone(),
            versions: VersionManager::new(),
        }
    }

    /// Sets the name used when no plugin supplies one.
    #[must_use]
    pub fn with_default_name(mut self, name: impl Into<String>) -> Self {
        self.default_name = Some(name.into());
        self
    }

    /// Sets the pre-release mode.
    #[must_use]
    pub fn with_pre_release(mut self, pre_release: Option<PreReleaseSetting>) -> Self {
        self.pre_release = pre_release;
        self
    }

    /// Returns whether runs target a pre-release, and on which channel.
    #[must_use]
    pub fn pre_release_mode(&self) -> (bool, Option<String>) {
        match &self.pre_release {
            Some(setting) => (setting.is_enabled(), setting.id().map(String::from)),
            None => (false, None),
        }
    }

    /// Runs every release step against `plugin`.
    ///
    /// # Errors
    ///
    /// Returns the first hook failure, [`CoreError::MissingName`] when no
    /// name can be found, or an error if the next version cannot be computed.
    pub async fn run_tasks(
        &self,
        plugin: &mut dyn ReleasePlugin,
        ctx: &mut ReleaseContext,
    ) -> CoreResult<RunSummary> {
        let mut tracker = StateTracker::new();
        info!(plugin = plugin.name(), dry_run = ctx.dry_run, "starting release run");

        match self.drive(plugin, ctx, &mut tracker).await {
            Ok(summary) => {
                info!(version = %summary.version, tag = %summary.tag_name, "release run complete");
                Ok(summary)
            }
            Err(err) => {
                let state = tracker.fail();
                warn!(%state, error = %err, "release run failed");
                Err(err)
            }
        }
    }

    async fn drive(
        &self,
        plugin: &mut dyn ReleasePlugin,
        ctx: &mut ReleaseContext,
        tracker: &mut StateTracker,
    ) -> CoreResult<RunSummary> {
        plugin
            .init(ctx)
            .await
            .map_err(hook_failed("init", tracker.current()))?;

        let (name, latest_version, changelog) = self.resolve_subject(&*plugin, ctx, tracker).await?;

        let (is_pre_release, pre_release_id) = self.pre_release_mode();
        let options =
            ReleaseOptions::new(&latest_version).with_pre_release(is_pre_release, pre_release_id);

        let increment = self.resolve_increment(&*plugin, ctx, &options, tracker).await?;
        tracker.advance();

        ctx.merge([
            (keys::NAME, Value::from(name.as_str())),
            (keys::LATEST_VERSION, Value::from(latest_version.as_str())),
            (keys::LATEST_TAG, Value::from(latest_version.as_str())),
            (keys::CHANGELOG, changelog.map_or(Value::Null, Value::from)),
        ]);

        let options = options.with_increment(increment);
        let version = self.resolve_version(&*plugin, ctx, &options, tracker).await?;
        ctx.merge(version_parts(&version));
        info!(%version, latest = %latest_version, "resolved next version");
        tracker.advance();

        plugin
            .before_bump(ctx)
            .await
            .map_err(hook_failed("before_bump", tracker.current()))?;
        plugin
            .bump(&version, ctx)
            .await
            .map_err(hook_failed("bump", tracker.current()))?;
        tracker.advance();

        let tag_name = ctx
            .get_str(keys::TAG_NAME)
            .filter(|tag| !tag.is_empty())
            .map_or_else(|| version.clone(), String::from);
        ctx.set(keys::TAG_NAME, tag_name.as_str());
        debug!(tag = %tag_name, "resolved tag name");
        tracker.advance();

        plugin
            .before_release(ctx)
            .await
            .map_err(hook_failed("before_release", tracker.current()))?;
        plugin
            .release(ctx)
            .await
            .map_err(hook_failed("release", tracker.current()))?;
        tracker.advance();

        plugin
            .after_release(ctx)
            .await
            .map_err(hook_failed("after_release", tracker.current()))?;
        tracker.advance();

        Ok(RunSummary {
            name,
            latest_version,
            version,
            tag_name,
            states: tracker.history().to_vec(),
        })
    }

    /// Resolves name, latest version and changelog.
    async fn resolve_subject(
        &self,
        plugin: &dyn ReleasePlugin,
        ctx: &ReleaseContext,
        tracker: &mut StateTracker,
    ) -> CoreResult<(String, String, Option<String>)> {
        let state = tracker.current();
        let name = Cascade::new("name")
            .then("get_name", async {
                plugin.get_name(ctx).await.map_err(hook_failed("get_name", state))
            })
            .then("default", async { Ok(self.default_name.clone()) })
            .resolve()
            .await?
            .ok_or(CoreError::MissingName)?;
        info!(%name, "resolved release name");
        tracker.advance();

        let state = tracker.current();
        let latest_version = Cascade::new("latest_version")
            .then("get_latest_version", async {
                plugin
                    .get_latest_version(ctx)
                    .await
                    .map_err(hook_failed("get_latest_version", state))
            })
            .resolve_or_else(|| Ok(DEFAULT_LATEST_VERSION.to_string()))
            .await?;

        let changelog = plugin
            .get_changelog(ctx)
            .await
            .map_err(hook_failed("get_changelog", state))?;
        debug!(%latest_version, has_changelog = changelog.is_some(), "resolved latest version");
        tracker.advance();

        Ok((name, latest_version, changelog))
    }

    /// Resolves the increment: plugin hook, then plugin context, then the
    /// shared context.
    async fn resolve_increment(
        &self,
        plugin: &dyn ReleasePlugin,
        ctx: &ReleaseContext,
        options: &ReleaseOptions,
        tracker: &StateTracker,
    ) -> CoreResult<Option<Increment>> {
        let state = tracker.current();
        let increment = Cascade::new("increment")
            .then("get_increment", async {
                plugin
                    .get_increment(options, ctx)
                    .await
                    .map_err(hook_failed("get_increment", state))
            })
            .then("plugin_context", async {
                increment_from(plugin.get_context(keys::INCREMENT).as_ref())
            })
            .then("context", async { increment_from(ctx.get(keys::INCREMENT)) })
            .resolve()
            .await?;

        match &increment {
            Some(increment) => debug!(%increment, "resolved increment"),
            None => debug!("no increment directive"),
        }
        Ok(increment)
    }

    /// Resolves the next version: unattended hook, then interactive hook,
    /// then version arithmetic.
    async fn resolve_version(
        &self,
        plugin: &dyn ReleasePlugin,
        ctx: &ReleaseContext,
        options: &ReleaseOptions,
        tracker: &StateTracker,
    ) -> CoreResult<String> {
        let state = tracker.current();
        Cascade::new("version")
            .then("get_incremented_version_ci", async {
                plugin
                    .get_incremented_version_ci(options, ctx)
                    .await
                    .map_err(hook_failed("get_incremented_version_ci", state))
            })
            .then("get_incremented_version", async {
                plugin
                    .get_incremented_version(options, ctx)
                    .await
                    .map_err(hook_failed("get_incremented_version", state))
            })
            .resolve_or_else(|| {
                // Plain arithmetic; channel identifiers are the version plugin's concern
                let increment = options.increment.clone().unwrap_or(Increment::Patch);
                self.versions.next(&options.latest_version, &increment, None)
            })
            .await
    }
}

fn hook_failed(hook: &'static str, state: RunState) -> impl FnOnce(PluginError) -> CoreError {
    move |source| CoreError::Hook {
        hook,
        state,
        source,
    }
}

fn increment_from(value: Option<&Value>) -> CoreResult<Option<Increment>> {
    match value {
        Some(value) => Increment::from_value(value).map_err(|e| match e {
            PluginError::InvalidIncrement(directive) => CoreError::InvalidIncrement(directive),
            other => CoreError::InvalidIncrement(other.to_string()),
        }),
        None => Ok(None),
    }
}
