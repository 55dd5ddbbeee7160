//! Built-in unattended version resolution.

use async_trait::async_trait;
use shipyard_plugin::{
    Increment, Plugin, PluginError, PluginResult, ReleaseContext, ReleaseOptions, ReleasePlugin,
};
use tracing::debug;

use crate::{CoreError, VersionManager};

/// Resolves the next version without prompting, aware of pre-release mode.
///
/// In pre-release mode a plain keyword is turned into its `pre*` variant, and
/// a run without an increment continues the current pre-release or starts a
/// new one. An exact version lower than the latest one is rejected.
#[derive(Debug, Default)]
pub struct VersionPlugin {
    versions: VersionManager,
}

impl VersionPlugin {
    /// Creates a new version plugin.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn resolve(&self, options: &ReleaseOptions) -> Result<Option<String>, CoreError> {
        let latest = options.latest_version.as_str();
        let pre_id = options.pre_release_id.as_deref();

        let increment = match &options.increment {
            Some(Increment::Skip) => return Ok(Some(latest.to_string())),
            Some(Increment::Exact(exact)) => {
                let current = self.versions.parse(latest)?;
                if *exact < current {
                    return Err(CoreError::InvalidIncrement(format!(
                        "{exact} is lower than the latest version {current}"
                    )));
                }
                return Ok(Some(exact.to_string()));
            }
            Some(keyword) if options.is_pre_release => keyword.to_pre(),
            Some(keyword) => keyword.clone(),
            None if options.is_pre_release => {
                if self.versions.parse(latest)?.pre.is_empty() {
                    Increment::Prepatch
                } else {
                    Increment::Prerelease
                }
            }
            None => return Ok(None),
        };

        debug!(%increment, latest, "computing unattended version");
        self.versions.next(latest, &increment, pre_id).map(Some)
    }
}

impl Plugin for VersionPlugin {
    fn name(&self) -> &'static str {
        "version"
    }

    fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    fn description(&self) -> &'static str {
        "Computes the next version from the increment and pre-release mode"
    }
}

#[async_trait]
impl ReleasePlugin for VersionPlugin {
    async fn get_incremented_version_ci(
        &self,
        options: &ReleaseOptions,
        _ctx: &ReleaseContext,
    ) -> PluginResult<Option<String>> {
        self.resolve(options)
            .map_err(|e| PluginError::ConfigError(e.to_string()))
    }
}
