//! CLI definition.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;

/// Run release tasks through a chain of plugins: resolve, bump, commit and tag.
#[derive(Debug, Parser)]
#[command(name = "shipyard")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the configuration file (default: nearest shipyard.toml)
    #[arg(short, long, global = true, env = "SHIPYARD_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Write a default shipyard.toml
    Init(commands::init::InitArgs),

    /// Run a release (resolve version, bump, commit, tag)
    Release(commands::release::ReleaseArgs),
}

impl Cli {
    /// Runs the CLI command.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Init(args) => commands::init::run(&args, self.config),
            Commands::Release(args) => commands::release::run(args, self.config),
        }
    }
}
