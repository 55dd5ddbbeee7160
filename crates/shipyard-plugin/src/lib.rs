//! Plugin system for Shipyard.
//!
//! This crate provides the plugin contract and the state shared during a run:
//! - [`Plugin`]: Base trait for all plugins
//! - [`ReleasePlugin`]: Lifecycle hooks driven by the orchestrator
//! - [`ReleaseContext`]: Key/value store threaded between hooks
//! - [`Increment`]: Typed increment directive
//! - [`PluginChain`]: Several plugins acting as one

mod chain;
mod context;
mod error;
mod increment;
mod options;
mod traits;

pub use chain::PluginChain;
pub use context::{ReleaseContext, keys};
pub use error::{PluginError, PluginResult};
pub use increment::Increment;
pub use options::ReleaseOptions;
pub use traits::Plugin;
pub use traits::release::ReleasePlugin;
