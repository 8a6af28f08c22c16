//! Name-keyed extractor registry.
//!
//! The [`ExtractorRegistry`] owns the extractors and is the single entry point
//! from `(extractor name, url)` to a downloaded resource tree.

use std::path::Path;

use tracing::{debug, info};

use super::{ExtractError, Extractor};
use crate::resource::{DownloadReport, Resource};

/// A collection of extractors looked up by site name.
pub struct ExtractorRegistry {
    extractors: Vec<Box<dyn Extractor>>,
}

impl ExtractorRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            extractors: Vec::new(),
        }
    }

    /// Registers an extractor, replacing any previous one with the same name.
    #[tracing::instrument(skip(self, extractor), fields(extractor_name))]
    pub fn register(&mut self, extractor: Box<dyn Extractor>) {
        tracing::Span::current().record("extractor_name", extractor.name());
        debug!(
            name = extractor.name(),
            kinds = ?extractor.resource_kinds(),
            "Registering extractor"
        );
        self.extractors
            .retain(|existing| !existing.name().eq_ignore_ascii_case(extractor.name()));
        self.extractors.push(extractor);
    }

    /// Registered names, in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.extractors.iter().map(|e| e.name()).collect()
    }

    /// Returns the number of registered extractors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    /// Returns true if no extractors are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }

    /// Looks up an extractor by name (ASCII case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::UnknownExtractor`] listing the registered names.
    pub fn get(&self, name: &str) -> Result<&dyn Extractor, ExtractError> {
        let name = name.trim();
        self.extractors
            .iter()
            .find(|e| e.name().eq_ignore_ascii_case(name))
            .map(AsRef::as_ref)
            .ok_or_else(|| ExtractError::unknown_extractor(name, &self.names()))
    }

    /// Resolves `url` with the named extractor.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::UnknownExtractor`] for an unregistered name and
    /// the extractor's own errors otherwise.
    #[tracing::instrument(skip(self))]
    pub async fn resolve(&self, name: &str, url: &str) -> Result<Resource, ExtractError> {
        let extractor = self.get(name)?;
        let resource = extractor.resolve(url).await?;
        info!(extractor = extractor.name(), kind = resource.kind(), "Resolved resource");
        Ok(resource)
    }

    /// Resolves `url` with the named extractor and downloads it under `destination`.
    ///
    /// # Errors
    ///
    /// Returns resolution errors and the resource's fatal download errors;
    /// child failures are in the returned report.
    #[tracing::instrument(skip(self), fields(destination = %destination.display()))]
    pub async fn download(
        &self,
        name: &str,
        url: &str,
        destination: &Path,
    ) -> Result<DownloadReport, ExtractError> {
        let resource = self.resolve(name, url).await?;
        resource.download(destination).await
    }
}

impl std::fmt::Debug for ExtractorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractorRegistry")
            .field("extractor_count", &self.extractors.len())
            .field("extractors", &self.names())
            .finish()
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::ExtractorConfig;
    use crate::extractor::build_default_registry;
    use async_trait::async_trait;

    struct NamedMockExtractor {
        name: &'static str,
    }

    #[async_trait]
    impl Extractor for NamedMockExtractor {
        fn name(&self) -> &str {
            self.name
        }

        fn resource_kinds(&self) -> &'static [&'static str] {
            &["thing"]
        }

        async fn resolve(&self, url: &str) -> Result<Resource, ExtractError> {
            Err(ExtractError::unknown_resource_kind(self.name, url, "thing", &[]))
        }
    }

    #[test]
    fn test_default_registry_has_every_site() {
        let registry = build_default_registry(&ExtractorConfig::default()).unwrap();
        assert_eq!(registry.names(), vec!["mangadex", "youtube"]);
        assert!(registry.get("MangaDex").is_ok());
    }

    #[test]
    fn test_default_registry_rejects_invalid_config() {
        let config = ExtractorConfig {
            concurrency: 0,
            ..ExtractorConfig::default()
        };
        assert!(matches!(
            build_default_registry(&config),
            Err(ExtractError::Config(_))
        ));
    }

    #[test]
    fn test_unknown_extractor_lists_names() {
        let registry = build_default_registry(&ExtractorConfig::default()).unwrap();
        let err = registry.get("vimeo").err().unwrap();
        assert!(matches!(err, ExtractError::UnknownExtractor { .. }));
        assert!(err.to_string().contains("mangadex, youtube"));
    }

    #[test]
    fn test_register_replaces_same_name() {
        let mut registry = ExtractorRegistry::new();
        registry.register(Box::new(NamedMockExtractor { name: "site" }));
        registry.register(Box::new(NamedMockExtractor { name: "SITE" }));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.names(), vec!["SITE"]);
    }

    #[tokio::test]
    async fn test_download_with_unknown_extractor_fails_cleanly() {
        let registry = ExtractorRegistry::new();
        let temp_dir = tempfile::TempDir::new().unwrap();
        let result = registry
            .download("nope", "https://example.com/x", temp_dir.path())
            .await;
        assert!(matches!(result, Err(ExtractError::UnknownExtractor { .. })));
        assert!(registry.is_empty());
    }
}
