//! Site extractors and the registry that selects them by name.
//!
//! Each supported site has one [`Extractor`] that turns a URL into a
//! [`Resource`]. The set of sites is closed: [`build_default_registry`]
//! registers all of them and nothing else is discovered at runtime.
//!
//! # Architecture
//!
//! - [`Extractor`] - Async trait that site extractors implement
//! - [`ExtractorRegistry`] - Name-keyed collection with the resolve/download entry point
//! - [`MangadexExtractor`] - Manga titles and chapters from the manga API
//! - [`YoutubeExtractor`] - Adaptive formats from video watch pages
//!
//! # Example
//!
//! ```no_run
//! use extractdl_core::{ExtractorConfig, build_default_registry};
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = build_default_registry(&ExtractorConfig::default())?;
//! let report = registry
//!     .download("mangadex", "https://mangadex.org/title/42", Path::new("./"))
//!     .await?;
//! println!("wrote {} files", report.files().len());
//! # Ok(())
//! # }
//! ```

mod error;
pub mod mangadex;
mod registry;
mod utils;
pub mod youtube;

pub use error::ExtractError;
pub use mangadex::MangadexExtractor;
pub use registry::ExtractorRegistry;
pub use youtube::YoutubeExtractor;

use async_trait::async_trait;
use tracing::debug;

use crate::config::ExtractorConfig;
use crate::fetch::Fetcher;
use crate::resource::Resource;

/// Builds the registry of every supported site, sharing one HTTP client.
///
/// # Errors
///
/// Returns [`ExtractError::Config`] if `config` is invalid, or
/// [`ExtractError::Fetch`] if the HTTP client cannot be built.
pub fn build_default_registry(config: &ExtractorConfig) -> Result<ExtractorRegistry, ExtractError> {
    config.validate()?;
    let fetcher = Fetcher::with_timeouts(config.connect_timeout_secs, config.read_timeout_secs)?;
    debug!(
        concurrency = config.concurrency,
        delay_ms = config.request_delay.as_millis(),
        lang = %config.target_lang,
        "building extractor registry"
    );

    let mut registry = ExtractorRegistry::new();
    registry.register(Box::new(MangadexExtractor::new(fetcher.clone(), config)));
    registry.register(Box::new(YoutubeExtractor::new(fetcher, config)));
    Ok(registry)
}

/// Trait that all site extractors implement.
///
/// # Object Safety
///
/// This trait uses `async_trait` to support dynamic dispatch via
/// `Box<dyn Extractor>` in the registry.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// The site identifier the extractor is registered under (e.g. "mangadex").
    fn name(&self) -> &str;

    /// The URL path kinds this extractor resolves (e.g. "title", "chapter").
    fn resource_kinds(&self) -> &'static [&'static str];

    /// Resolves `url` to a resource, fetching only the resource's own metadata.
    async fn resolve(&self, url: &str) -> Result<Resource, ExtractError>;
}
