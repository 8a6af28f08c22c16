//! Extractdl Core Library
//!
//! This library resolves URLs on supported sites into typed resources and
//! downloads them into a directory tree: a manga becomes one directory per
//! chapter, each holding a `meta.json` sidecar and the page images.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`config`] - Settings shared by the extractors (delay, concurrency, language)
//! - [`extractor`] - Site extractors and the name-keyed registry
//! - [`fetch`] - HTTP fetching with per-request delay and streaming downloads
//! - [`resource`] - Resolved resources, naming rules and download reports

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod extractor;
pub mod fetch;
pub mod resource;
#[cfg(test)]
pub mod test_support;
pub(crate) mod user_agent;

// Re-export commonly used types
pub use config::{ConfigError, DEFAULT_CONCURRENCY, ExtractorConfig};
pub use extractor::{ExtractError, Extractor, ExtractorRegistry, build_default_registry};
pub use fetch::{FetchError, FetchOptions, FetchResponse, Fetcher};
pub use resource::{ChildFailure, DownloadReport, Resource};
