//! Git operations used by Shipyard releases.
//!
//! Reads version tags and the commit history since the last release, and
//! records a release as a commit plus an annotated tag.

mod commit;
mod error;
mod repository;

pub use commit::Commit;
pub use error::{GitError, GitResult};
pub use repository::{Repository, VersionTag};
