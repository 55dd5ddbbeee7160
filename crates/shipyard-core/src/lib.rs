//! Core library for Shipyard.
//!
//! This crate drives a release run: it resolves the release name and
//! versions through ordered fallbacks, applies version arithmetic and calls
//! the plugin hooks in their fixed order.

mod cascade;
mod error;
mod orchestrator;
mod seed;
mod state;
mod version;
mod version_plugin;

pub use cascade::{Cascade, Resolver};
pub use error::{CoreError, CoreResult};
pub use orchestrator::{DEFAULT_LATEST_VERSION, Orchestrator, RunSummary};
pub use seed::seed_context;
pub use state::{RunState, StateTracker};
pub use version::{VersionManager, version_parts};
pub use version_plugin::VersionPlugin;
