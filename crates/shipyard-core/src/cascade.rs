//! Ordered fallback resolution.

use std::future::Future;
use std::pin::Pin;

use tracing::debug;

use crate::CoreResult;

/// A deferred source of an optional value.
pub type Resolver<'a, T> = Pin<Box<dyn Future<Output = CoreResult<Option<T>>> + Send + 'a>>;

/// An ordered list of sources probed until one yields a value.
///
/// Sources are futures, so nothing runs until [`Cascade::resolve`] polls
/// them. Once a source answers `Some`, the remaining ones are dropped
/// without ever being polled. Only `None` counts as absent: an empty string
/// is a present answer.
pub struct Cascade<'a, T> {
    label: &'static str,
    sources: Vec<(&'static str, Resolver<'a, T>)>,
}

impl<'a, T> Cascade<'a, T> {
    /// Creates an empty cascade; `label` names it in logs.
    #[must_use]
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            sources: Vec::new(),
        }
    }

    /// Appends a source.
    #[must_use]
    pub fn then<F>(mut self, source: &'static str, resolver: F) -> Self
    where
        F: Future<Output = CoreResult<Option<T>>> + Send + 'a,
    {
        self.sources.push((source, Box::pin(resolver)));
        self
    }

    /// Probes each source in order and returns the first present value.
    ///
    /// # Errors
    ///
    /// Returns the first error a probed source reports.
    pub async fn resolve(self) -> CoreResult<Option<T>> {
        let Self { label, sources } = self;
        for (source, resolver) in sources {
            if let Some(value) = resolver.await? {
                debug!(cascade = label, source, "resolved");
                return Ok(Some(value));
            }
        }
        debug!(cascade = label, "no source answered");
        Ok(None)
    }

    /// Like [`Cascade::resolve`], falling back to `default` when no source
    /// answers.
    ///
    /// # Errors
    ///
    /// Returns the first error a probed source or `default` reports.
    pub async fn resolve_or_else<D>(self, default: D) -> CoreResult<T>
    where
        D: FnOnce() -> CoreResult<T>,
    {
        match self.resolve().await? {
            Some(value) => Ok(value),
            None => default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::CoreError;

    #[tokio::test]
    async fn test_first_present_wins() {
        let value = Cascade::new("test")
            .then("a", async { Ok(None) })
            .then("b", async { Ok(Some("minor")) })
            .then("c", async { Ok(Some("major")) })
            .resolve()
            .await
            .unwrap();
        assert_eq!(value, Some("minor"));
    }

    #[tokio::test]
    async fn test_later_sources_not_polled() {
        let polled = AtomicUsize::new(0);
        let value = Cascade::new("test")
            .then("a", async { Ok(Some(1)) })
            .then("b", async {
                polled.fetch_add(1, Ordering::SeqCst);
                Ok(Some(2))
            })
            .resolve()
            .await
            .unwrap();
        assert_eq!(value, Some(1));
        assert_eq!(polled.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_string_is_present() {
        let value = Cascade::new("test")
            .then("a", async { Ok(Some(String::new())) })
            .then("b", async { Ok(Some("1.0.1".to_string())) })
            .resolve()
            .await
            .unwrap();
        assert_eq!(value.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_all_absent() {
        let cascade: Cascade<'_, u8> = Cascade::new("test")
            .then("a", async { Ok(None) })
            .then("b", async { Ok(None) });
        assert!(cascade.resolve().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_error_stops_resolution() {
        let polled = AtomicUsize::new(0);
        let result: CoreResult<Option<u8>> = Cascade::new("test")
            .then("a", async { Err(CoreError::MissingName) })
            .then("b", async {
                polled.fetch_add(1, Ordering::SeqCst);
                Ok(Some(1))
            })
            .resolve()
            .await;
        assert!(result.is_err());
        assert_eq!(polled.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_resolve_or_else_default() {
        let value = Cascade::new("test")
            .then("a", async { Ok(None) })
            .resolve_or_else(|| Ok("1.0.0"))
            .await
            .unwrap();
        assert_eq!(value, "1.0.0");
    }

    #[tokio::test]
    async fn test_resolve_or_else_default_not_called() {
        let value = Cascade::new("test")
            .then("a", async { Ok(Some(7)) })
            .resolve_or_else(|| Err(CoreError::MissingName))
            .await
            .unwrap();
        assert_eq!(value, 7);
    }
}
