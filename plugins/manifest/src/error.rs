//! Manifest error types.

use std::path::PathBuf;

use shipyard_plugin::PluginError;
use thiserror::Error;

/// Errors raised while reading or bumping manifests.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// Manifest file not found.
    #[error("manifest not found: {0}")]
    NotFound(PathBuf),

    /// File is neither a Cargo nor an npm manifest.
    #[error("unsupported manifest: {0}")]
    Unsupported(PathBuf),

    /// Manifest content could not be parsed.
    #[error("failed to parse {file}: {reason}")]
    Parse {
        /// Offending file.
        file: PathBuf,
        /// Parser message.
        reason: String,
    },

    /// Manifest has no literal version to replace.
    #[error("no version field in {0}")]
    VersionNotFound(PathBuf),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for manifest operations.
pub type ManifestResult<T> = Result<T, ManifestError>;

impl From<ManifestError> for PluginError {
    fn from(err: ManifestError) -> Self {
        match err {
            ManifestError::Io(io) => PluginError::Io(io),
            other => PluginError::ExecutionFailed(other.to_string()),
        }
    }
}
