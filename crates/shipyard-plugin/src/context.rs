//! Release context shared between the orchestrator and plugin hooks.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::Value;

/// Well-known context keys.
pub mod keys {
    /// Name of the release subject.
    pub const NAME: &str = "name";
    /// Last published version.
    pub const LATEST_VERSION: &str = "latestVersion";
    /// Tag of the last published version.
    pub const LATEST_TAG: &str = "latestTag";
    /// Changes since the latest version.
    pub const CHANGELOG: &str = "changelog";
    /// Increment directive supplied from outside the plugin.
    pub const INCREMENT: &str = "increment";
    /// The resolved release version.
    pub const VERSION: &str = "version";
    /// Major component of the resolved version.
    pub const MAJOR: &str = "major";
    /// Minor component of the resolved version.
    pub const MINOR: &str = "minor";
    /// Patch component of the resolved version.
    pub const PATCH: &str = "patch";
    /// Pre-release component of the resolved version.
    pub const PRERELEASE: &str = "prerelease";
    /// Build metadata of the resolved version.
    pub const BUILD: &str = "build";
    /// Whether the resolved version is a pre-release.
    pub const IS_PRE_RELEASE: &str = "isPreRelease";
    /// Leading identifier of the resolved pre-release.
    pub const PRE_RELEASE_ID: &str = "preReleaseId";
    /// Name of the tag to create for the release.
    pub const TAG_NAME: &str = "tagName";
}

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{\s*([A-Za-z0-9_.-]+)\s*\}").expect("invalid regex"));

/// Shared state passed to all hooks during one release run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReleaseContext {
    /// Whether this is a dry run (no actual changes).
    pub dry_run: bool,

    /// Whether the run is unattended.
    pub ci: bool,

    values: BTreeMap<String, Value>,
}

impl ReleaseContext {
    /// Creates an empty release context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the dry run flag.
    #[must_use]
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Sets the unattended flag.
    #[must_use]
    pub fn ci(mut self, ci: bool) -> Self {
        self.ci = ci;
        self
    }

    /// Gets a value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Gets a string value.
    ///
    /// Returns `None` when the key is missing or not a string.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    /// Returns true if the key holds a value other than `null`.
    #[must_use]
    pub fn is_set(&self, key: &str) -> bool {
        self.values.get(key).is_some_and(|v| !v.is_null())
    }

    /// Sets a value, overwriting any previous one.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Sets several values at once.
    pub fn merge<K, V>(&mut self, entries: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<Value>,
    {
        for (key, value) in entries {
            self.set(key, value);
        }
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if no entry was ever set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Replaces `${key}` placeholders with context values.
    ///
    /// Strings are inserted verbatim, other values in their JSON form.
    /// Missing keys and `null` render as the empty string.
    #[must_use]
    pub fn render(&self, template: &str) -> String {
        PLACEHOLDER
            .replace_all(template, |caps: &Captures<'_>| match self.get(&caps[1]) {
                None | Some(Value::Null) => String::new(),
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
            })
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new() {
        let ctx = ReleaseContext::new();
        assert!(ctx.is_empty());
        assert!(!ctx.dry_run);
        assert!(!ctx.ci);
    }

    #[test]
    fn test_flags_builder() {
        let ctx = ReleaseContext::new().dry_run(true).ci(true);
        assert!(ctx.dry_run);
        assert!(ctx.ci);
    }

    #[test]
    fn test_get_none() {
        let ctx = ReleaseContext::new();
        assert!(ctx.get(keys::NAME).is_none());
        assert!(ctx.get_str(keys::NAME).is_none());
    }

    #[test]
    fn test_set_and_get() {
        let mut ctx = ReleaseContext::new();
        ctx.set(keys::NAME, "shipyard");
        assert_eq!(ctx.get(keys::NAME), Some(&json!("shipyard")));
        assert_eq!(ctx.get_str(keys::NAME), Some("shipyard"));
    }

    #[test]
    fn test_get_str_non_string() {
        let mut ctx = ReleaseContext::new();
        ctx.set(keys::MAJOR, 1);
        assert!(ctx.get_str(keys::MAJOR).is_none());
    }

    #[test]
    fn test_set_overwrite() {
        let mut ctx = ReleaseContext::new();
        ctx.set("key", "first");
        ctx.set("key", "second");
        assert_eq!(ctx.get_str("key"), Some("second"));
        assert_eq!(ctx.len(), 1);
    }

    #[test]
    fn test_merge_keeps_other_keys() {
        let mut ctx = ReleaseContext::new();
        ctx.set(keys::TAG_NAME, "custom");
        ctx.merge([(keys::NAME, json!("app")), (keys::VERSION, json!("1.0.0"))]);
        assert_eq!(ctx.get_str(keys::TAG_NAME), Some("custom"));
        assert_eq!(ctx.get_str(keys::NAME), Some("app"));
        assert_eq!(ctx.get_str(keys::VERSION), Some("1.0.0"));
    }

    #[test]
    fn test_is_set() {
        let mut ctx = ReleaseContext::new();
        ctx.set(keys::CHANGELOG, Value::Null);
        ctx.set(keys::NAME, "app");
        assert!(!ctx.is_set(keys::CHANGELOG));
        assert!(ctx.is_set(keys::NAME));
        assert!(!ctx.is_set(keys::TAG_NAME));
    }

    #[test]
    fn test_render() {
        let mut ctx = ReleaseContext::new();
        ctx.set(keys::VERSION, "1.2.3");
        ctx.set(keys::NAME, "app");
        assert_eq!(ctx.render("v${version}"), "v1.2.3");
        assert_eq!(
            ctx.render("Release ${name} ${ version }"),
            "Release app 1.2.3"
        );
    }

    #[test]
    fn test_render_non_string_and_missing() {
        let mut ctx = ReleaseContext::new();
        ctx.set(keys::MAJOR, 4);
        ctx.set(keys::CHANGELOG, Value::Null);
        assert_eq!(ctx.render("${major}.x"), "4.x");
        assert_eq!(ctx.render("[${changelog}][${missing}]"), "[][]");
    }

    #[test]
    fn test_render_without_placeholders() {
        let ctx = ReleaseContext::new();
        assert_eq!(ctx.render("plain text"), "plain text");
    }
}
