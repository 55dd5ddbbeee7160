//! Options handed to version resolution hooks.

use crate::Increment;

/// Inputs for resolving the next version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseOptions {
    /// The last published version.
    pub latest_version: String,

    /// The resolved increment directive, if any source supplied one.
    pub increment: Option<Increment>,

    /// Whether the run targets a pre-release channel.
    pub is_pre_release: bool,

    /// The pre-release channel identifier (e.g. `beta`).
    pub pre_release_id: Option<String>,
}

impl ReleaseOptions {
    /// Creates options for a stable release with no increment resolved yet.
    #[must_use]
    pub fn new(latest_version: impl Into<String>) -> Self {
        Self {
            latest_version: latest_version.into(),
            increment: None,
            is_pre_release: false,
            pre_release_id: None,
        }
    }

    /// Sets the increment directive.
    #[must_use]
    pub fn with_increment(mut self, increment: Option<Increment>) -> Self {
        self.increment = increment;
        self
    }

    /// Sets the pre-release mode.
    #[must_use]
    pub fn with_pre_release(mut self, is_pre_release: bool, id: Option<String>) -> Self {
        self.is_pre_release = is_pre_release;
        self.pre_release_id = id;
        self
    }
}
