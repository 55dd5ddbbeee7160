//! Git repository wrapper.

use std::path::{Path, PathBuf};

use chrono::{TimeZone, Utc};
use git2::{ErrorCode, IndexAddOption, Repository as Git2Repo, StatusOptions};
use semver::Version;
use tracing::debug;

use crate::{Commit, GitError, GitResult};

/// A tag whose name is a prefixed semantic version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionTag {
    /// Full tag name (e.g. `v1.2.3`).
    pub name: String,
    /// Version encoded in the name.
    pub version: Version,
}

/// A Git repository wrapper.
pub struct Repository {
    inner: Git2Repo,
}

impl Repository {
    /// Opens a repository at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not a valid Git repository.
    pub fn open(path: impl AsRef<Path>) -> GitResult<Self> {
        let path = path.as_ref();
        let inner = Git2Repo::open(path).map_err(|_| GitError::NotARepo(path.to_path_buf()))?;
        Ok(Self { inner })
    }

    /// Finds the repository containing `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if neither `path` nor a parent is inside a repository.
    pub fn discover_from(path: impl AsRef<Path>) -> GitResult<Self> {
        let path = path.as_ref();
        let inner =
            Git2Repo::discover(path).map_err(|_| GitError::NotARepo(path.to_path_buf()))?;
        Ok(Self { inner })
    }

    /// Returns the working directory.
    ///
    /// # Errors
    ///
    /// Returns an error for bare repositories.
    pub fn workdir(&self) -> GitResult<&Path> {
        self.inner.workdir().ok_or(GitError::Bare)
    }

    /// Returns the name of the working directory.
    #[must_use]
    pub fn name(&self) -> Option<String> {
        let workdir = self.inner.workdir()?;
        let workdir = workdir.canonicalize().unwrap_or_else(|_| PathBuf::from(workdir));
        workdir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
    }

    /// Returns all tag names.
    ///
    /// # Errors
    ///
    /// Returns an error if tags cannot be read.
    pub fn tags(&self) -> GitResult<Vec<String>> {
        let tags = self.inner.tag_names(None)?;
        Ok(tags.iter().flatten().map(String::from).collect())
    }

    /// Returns true if a tag with this name exists.
    #[must_use]
    pub fn tag_exists(&self, name: &str) -> bool {
        self.inner.refname_to_id(&format!("refs/tags/{name}")).is_ok()
    }

    /// Returns the tags made of `prefix` and a version, highest first.
    ///
    /// # Errors
    ///
    /// Returns an error if tags cannot be read.
    pub fn version_tags(&self, prefix: &str) -> GitResult<Vec<VersionTag>> {
        let mut tags: Vec<VersionTag> = self
            .tags()?
            .into_iter()
            .filter_map(|name| {
                let version = Version::parse(name.strip_prefix(prefix)?).ok()?;
                Some(VersionTag { name, version })
            })
            .collect();

        tags.sort_by(|a, b| b.version.cmp(&a.version));
        Ok(tags)
    }

    /// Returns the highest version tag for `prefix`.
    ///
    /// # Errors
    ///
    /// Returns an error if tags cannot be read.
    pub fn latest_version_tag(&self, prefix: &str) -> GitResult<Option<VersionTag>> {
        Ok(self.version_tags(prefix)?.into_iter().next())
    }

    /// Returns commits reachable from HEAD but not from `tag`, newest first.
    ///
    /// Without a tag the whole history is returned. A repository without
    /// commits yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns an error if the tag does not exist or history cannot be read.
    pub fn commits_since(&self, tag: Option<&str>) -> GitResult<Vec<Commit>> {
        if self.head_commit()?.is_none() {
            return Ok(Vec::new());
        }

        let mut revwalk = self.inner.revwalk()?;
        revwalk.push_head()?;

        if let Some(tag) = tag {
            let tagged = self
                .inner
                .find_reference(&format!("refs/tags/{tag}"))
                .and_then(|reference| reference.peel_to_commit())
                .map_err(|_| GitError::TagNotFound(tag.to_string()))?;
            revwalk.hide(tagged.id())?;
        }

        let mut commits = Vec::new();
        for oid in revwalk {
            let oid = oid?;
            let commit = self.inner.find_commit(oid)?;
            let author = commit.author();

            commits.push(Commit {
                hash: oid.to_string(),
                message: commit.message().unwrap_or("").to_string(),
                author: author.name().unwrap_or("Unknown").to_string(),
                date: Utc
                    .timestamp_opt(commit.time().seconds(), 0)
                    .single()
                    .unwrap_or_else(Utc::now),
            });
        }

        debug!(count = commits.len(), ?tag, "read commits");
        Ok(commits)
    }

    /// Returns true if tracked files have no uncommitted changes.
    ///
    /// Untracked files are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the status cannot be read.
    pub fn is_clean(&self) -> GitResult<bool> {
        let mut options = StatusOptions::new();
        options.include_untracked(false).include_ignored(false);
        let statuses = self.inner.statuses(Some(&mut options))?;
        Ok(statuses.is_empty())
    }

    /// Stages every change and commits it on HEAD.
    ///
    /// Returns the new commit id, or `None` when there was nothing to commit.
    ///
    /// # Errors
    ///
    /// Returns an error if staging or committing fails (e.g. no identity).
    pub fn commit_all(&self, message: &str) -> GitResult<Option<String>> {
        let mut index = self.inner.index()?;
        index.add_all(["*"].iter(), IndexAddOption::DEFAULT, None)?;
        index.update_all(["*"].iter(), None)?;
        index.write()?;
        let tree_id = index.write_tree()?;

        let parent = self.head_commit()?;
        if parent.as_ref().is_some_and(|p| p.tree_id() == tree_id) {
            debug!("nothing to commit");
            return Ok(None);
        }

        let tree = self.inner.find_tree(tree_id)?;
        let signature = self.inner.signature()?;
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();
        let oid = self
            .inner
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)?;

        debug!(%oid, "created commit");
        Ok(Some(oid.to_string()))
    }

    /// Creates an annotated tag on HEAD.
    ///
    /// # Errors
    ///
    /// Returns an error if the tag exists or cannot be created.
    pub fn create_tag(&self, name: &str, message: &str) -> GitResult<()> {
        if self.tag_exists(name) {
            return Err(GitError::TagExists(name.to_string()));
        }

        let head = self.inner.head()?;
        let commit = head.peel_to_commit()?;
        let signature = self.inner.signature()?;

        self.inner
            .tag(name, commit.as_object(), &signature, message, false)?;

        debug!(tag = name, "created tag");
        Ok(())
    }

    fn head_commit(&self) -> GitResult<Option<git2::Commit<'_>>> {
        match self.inner.head() {
            Ok(head) => Ok(Some(head.peel_to_commit()?)),
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}
