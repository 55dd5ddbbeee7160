//! Initialize command.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::debug;

use shipyard_config::{CONFIG_FILE_NAME, Config, write_config};
use shipyard_git::Repository;
use shipyard_plugin_manifest::ManifestPlugin;

/// Arguments for the init command.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Force overwrite existing configuration
    #[arg(short, long)]
    pub force: bool,
}

/// Runs the init command.
pub fn run(args: &InitArgs, config_path: Option<PathBuf>) -> Result<()> {
    let cwd = env::current_dir().context("failed to read current directory")?;
    let path = config_path.unwrap_or_else(|| cwd.join(CONFIG_FILE_NAME));

    let mut config = Config::default();
    config.plugins.manifest.files = ManifestPlugin::detect(&cwd);
    config.plugins.git.enabled = Repository::discover_from(&cwd).is_ok();
    debug!(
        files = ?config.plugins.manifest.files,
        git = config.plugins.git.enabled,
        "detected project layout"
    );

    write_config(&path, &config, args.force)
        .with_context(|| format!("failed to write {}", path.display()))?;

    println!("Created {}", path.display());
    if config.plugins.manifest.files.is_empty() {
        println!("  No manifest detected; set [plugins.manifest] files to track a version file");
    } else {
        println!("  Manifests: {}", config.plugins.manifest.files.join(", "));
    }
    if !config.plugins.git.enabled {
        println!("  Not a git repository; git plugin disabled");
    }
    Ok(())
}
