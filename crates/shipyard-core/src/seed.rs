//! Building the initial release context from configuration.

use shipyard_config::Config;
use shipyard_plugin::{ReleaseContext, keys};
use tracing::debug;

use crate::CoreResult;

/// Builds the context a release run starts from.
///
/// The `[context]` table is copied first; `release.increment` then takes the
/// `increment` key, so it wins over a value of the same name in the table.
///
/// # Errors
///
/// Returns an error if a `[context]` value cannot be represented.
pub fn seed_context(config: &Config) -> CoreResult<ReleaseContext> {
    let mut ctx = ReleaseContext::new()
        .dry_run(config.release.dry_run)
        .ci(config.release.ci);

    ctx.merge(config.context_values()?);

    if let Some(increment) = &config.release.increment {
        ctx.set(keys::INCREMENT, increment.to_value());
    }

    debug!(entries = ctx.len(), "seeded release context");
    Ok(ctx)
}
