//! Plugin traits.

pub mod release;

/// Identity shared by every plugin.
pub trait Plugin: Send + Sync {
    /// Returns the plugin name, used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Returns the plugin version.
    fn version(&self) -> &'static str;

    /// Returns a short description of the plugin.
    fn description(&self) -> &'static str {
        ""
    }
}
