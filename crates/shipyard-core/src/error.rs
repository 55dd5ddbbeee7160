//! Core error types.

use thiserror::Error;

use crate::RunState;

/// Core-related errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A plugin hook failed; the run stopped in `state`.
    #[error("hook `{hook}` failed after {state}: {source}")]
    Hook {
        /// Name of the failing hook.
        hook: &'static str,
        /// Last state the run reached.
        state: RunState,
        /// Error reported by the plugin.
        #[source]
        source: shipyard_plugin::PluginError,
    },

    /// No plugin supplied a name and no default is configured.
    #[error("no release name: no plugin supplied one and no default name is configured")]
    MissingName,

    /// A version could not be parsed.
    #[error("invalid version `{version}`: {source}")]
    InvalidVersion {
        /// The offending value.
        version: String,
        /// Parse failure.
        #[source]
        source: semver::Error,
    },

    /// An increment directive could not be applied.
    #[error("invalid increment: {0}")]
    InvalidIncrement(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(#[from] shipyard_config::ConfigError),
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
