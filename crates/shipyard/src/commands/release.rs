//! Release command.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use tracing::{debug, info};

use shipyard_config::{
    Config, ConfigOverrides, IncrementSetting, PreReleaseSetting, load_config,
    load_or_default_from,
};
use shipyard_core::{Orchestrator, RunSummary, VersionPlugin, seed_context};
use shipyard_plugin::PluginChain;
use shipyard_plugin_changelog::ChangelogPlugin;
use shipyard_plugin_git::GitPlugin;
use shipyard_plugin_manifest::ManifestPlugin;

/// Arguments for the release command.
#[derive(Debug, Args)]
pub struct ReleaseArgs {
    /// Increment: major, minor, patch, pre*, an exact version, or false
    #[arg(short, long, env = "SHIPYARD_INCREMENT")]
    pub increment: Option<String>,

    /// Release a pre-release, optionally on a channel (e.g. beta)
    #[arg(
        short,
        long,
        env = "SHIPYARD_PRE_RELEASE",
        num_args = 0..=1,
        default_missing_value = "true",
        value_name = "ID"
    )]
    pub pre_release: Option<String>,

    /// Perform a dry run without making changes
    #[arg(short, long, env = "SHIPYARD_DRY_RUN")]
    pub dry_run: bool,

    /// Run unattended
    #[arg(long, env = "SHIPYARD_CI")]
    pub ci: bool,

    /// Name used when no plugin supplies one
    #[arg(short, long, env = "SHIPYARD_NAME")]
    pub name: Option<String>,

    /// Print the run summary as JSON
    #[arg(long)]
    pub json: bool,
}

impl ReleaseArgs {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            name: self.name.clone(),
            increment: self.increment.as_deref().map(IncrementSetting::from),
            pre_release: self.pre_release.as_deref().map(|value| match value {
                "true" => PreReleaseSetting::Flag(true),
                "false" => PreReleaseSetting::Flag(false),
                id => PreReleaseSetting::Id(id.to_string()),
            }),
            ci: self.ci,
            dry_run: self.dry_run,
        }
    }
}

/// Runs the release command.
pub fn run(args: ReleaseArgs, config_path: Option<PathBuf>) -> Result<()> {
    let cwd = env::current_dir().context("failed to read current directory")?;
    let (config, root) = load(&cwd, config_path)?;
    let config = config.with_overrides(args.overrides());

    let rt = tokio::runtime::Runtime::new().context("failed to create async runtime")?;
    let summary = rt.block_on(async { release(&config, &root).await })?;

    if args.json {
        let json = serde_json::to_string_pretty(&summary).context("failed to encode summary")?;
        println!("{json}");
    } else {
        print_summary(&summary, config.release.dry_run);
    }
    Ok(())
}

/// Loads the configuration and returns it with the project root.
fn load(cwd: &Path, config_path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let (config, path) = match config_path {
        Some(path) => {
            let config = load_config(&path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            (config, Some(path))
        }
        None => load_or_default_from(cwd).context("failed to load configuration")?,
    };

    let root = path
        .as_deref()
        .and_then(Path::parent)
        .filter(|dir| !dir.as_os_str().is_empty())
        .map_or_else(|| cwd.to_path_buf(), Path::to_path_buf);
    debug!(config = ?path, root = %root.display(), "loaded configuration");
    Ok((config, root))
}

/// Builds the plugin chain for `config`.
fn plugins(config: &Config, root: &Path) -> PluginChain {
    let mut chain = PluginChain::new().with(Box::new(VersionPlugin::new()));

    let manifest = &config.plugins.manifest;
    if !manifest.files.is_empty() {
        chain.push(Box::new(ManifestPlugin::new(root, manifest.files.clone())));
    }

    let changelog = &config.plugins.changelog;
    if changelog.enabled {
        chain.push(Box::new(ChangelogPlugin::new(root.join(&changelog.output))));
    }

    let git = &config.plugins.git;
    if git.enabled {
        chain.push(Box::new(GitPlugin::new(root, git.clone())));
    }

    chain
}

async fn release(config: &Config, root: &Path) -> Result<RunSummary> {
    let mut ctx = seed_context(config).context("failed to seed release context")?;
    let mut chain = plugins(config, root);
    info!(plugins = ?chain.names(), "running release");

    Orchestrator::from_config(config)
        .run_tasks(&mut chain, &mut ctx)
        .await
        .context("release failed")
}

fn print_summary(summary: &RunSummary, dry_run: bool) {
    println!(
        "{} {} -> {} (tag {})",
        summary.name, summary.latest_version, summary.version, summary.tag_name
    );
    if dry_run {
        println!("Dry run completed. No changes were made.");
    } else {
        println!("Release {} completed successfully!", summary.version);
    }
}
