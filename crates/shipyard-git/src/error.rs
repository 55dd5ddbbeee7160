//! Git error types.

use std::path::PathBuf;

use thiserror::Error;

/// Git-related errors.
#[derive(Debug, Error)]
pub enum GitError {
    /// Not a git repository.
    #[error("not a git repository: {0}")]
    NotARepo(PathBuf),

    /// Repository has no working directory.
    #[error("repository has no working directory")]
    Bare,

    /// Tag not found.
    #[error("tag not found: {0}")]
    TagNotFound(String),

    /// Tag already exists.
    #[error("tag already exists: {0}")]
    TagExists(String),

    /// Uncommitted changes in the working tree.
    #[error("working tree has uncommitted changes")]
    Dirty,

    /// Git2 error.
    #[error("git error: {0}")]
    Git2(#[from] git2::Error),
}

/// Result type for git operations.
pub type GitResult<T> = Result<T, GitError>;
