//! Several plugins acting as one.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::{Increment, Plugin, PluginResult, ReleaseContext, ReleaseOptions, ReleasePlugin};

/// Combines plugins into a single [`ReleasePlugin`].
///
/// Getters ask each plugin in order and return the first present answer.
/// Lifecycle hooks run on every plugin, in order, and stop at the first error.
#[derive(Default)]
pub struct PluginChain {
    plugins: Vec<Box<dyn ReleasePlugin>>,
}

impl PluginChain {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a plugin.
    #[must_use]
    pub fn with(mut self, plugin: Box<dyn ReleasePlugin>) -> Self {
        self.plugins.push(plugin);
        self
    }

    /// Appends a plugin in place.
    pub fn push(&mut self, plugin: Box<dyn ReleasePlugin>) {
        self.plugins.push(plugin);
    }

    /// Returns the names of the chained plugins, in order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    /// Returns the number of chained plugins.
    #[must_use]
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Returns true if the chain holds no plugin.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl std::fmt::Debug for PluginChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginChain")
            .field("plugins", &self.names())
            .finish()
    }
}

impl Plugin for PluginChain {
    fn name(&self) -> &'static str {
        "chain"
    }

    fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    fn description(&self) -> &'static str {
        "Runs several plugins as one"
    }
}

/// Returns the first present answer of `$method` across the chain.
macro_rules! first_answer {
    ($self:ident, $method:ident ( $($arg:expr),* )) => {{
        for plugin in &$self.plugins {
            if let Some(value) = plugin.$method($($arg),*).await? {
                debug!(plugin = plugin.name(), hook = stringify!($method), "answered");
                return Ok(Some(value));
            }
        }
        Ok(None)
    }};
}

/// Runs `$method` on every plugin of the chain.
macro_rules! every_plugin {
    ($self:ident, $method:ident ( $($arg:expr),* )) => {{
        for plugin in &mut $self.plugins {
            debug!(plugin = plugin.name(), hook = stringify!($method), "running hook");
            plugin.$method($($arg),*).await?;
        }
        Ok(())
    }};
}

#[async_trait]
impl ReleasePlugin for PluginChain {
    async fn init(&mut self, ctx: &ReleaseContext) -> PluginResult<()> {
        every_plugin!(self, init(ctx))
    }

    async fn get_name(&self, ctx: &ReleaseContext) -> PluginResult<Option<String>> {
        first_answer!(self, get_name(ctx))
    }

    async fn get_latest_version(&self, ctx: &ReleaseContext) -> PluginResult<Option<String>> {
        first_answer!(self, get_latest_version(ctx))
    }

    async fn get_changelog(&self, ctx: &ReleaseContext) -> PluginResult<Option<String>> {
        first_answer!(self, get_changelog(ctx))
    }

    async fn get_increment(
        &self,
        options: &ReleaseOptions,
        ctx: &ReleaseContext,
    ) -> PluginResult<Option<Increment>> {
        first_answer!(self, get_increment(options, ctx))
    }

    async fn get_incremented_version_ci(
        &self,
        options: &ReleaseOptions,
        ctx: &ReleaseContext,
    ) -> PluginResult<Option<String>> {
        first_answer!(self, get_incremented_version_ci(options, ctx))
    }

    async fn get_incremented_version(
        &self,
        options: &ReleaseOptions,
        ctx: &ReleaseContext,
    ) -> PluginResult<Option<String>> {
        first_answer!(self, get_incremented_version(options, ctx))
    }

    fn get_context(&self, key: &str) -> Option<Value> {
        self.plugins.iter().find_map(|p| p.get_context(key))
    }

    async fn before_bump(&mut self, ctx: &mut ReleaseContext) -> PluginResult<()> {
        every_plugin!(self, before_bump(ctx))
    }

    async fn bump(&mut self, version: &str, ctx: &mut ReleaseContext) -> PluginResult<()> {
        every_plugin!(self, bump(version, ctx))
    }

    async fn before_release(&mut self, ctx: &mut ReleaseContext) -> PluginResult<()> {
        every_plugin!(self, before_release(ctx))
    }

    async fn release(&mut self, ctx: &mut ReleaseContext) -> PluginResult<()> {
        every_plugin!(self, release(ctx))
    }

    async fn after_release(&mut self, ctx: &mut ReleaseContext) -> PluginResult<()> {
        every_plugin!(self, after_release(ctx))
    }
}
