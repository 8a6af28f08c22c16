//! Error types for extraction and resource downloads.
//!
//! User-facing variants follow the What/Why/Fix pattern used across the
//! project; fetch-level failures are wrapped unchanged.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::fetch::FetchError;

/// Errors that can occur while resolving a URL or downloading a resource.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// A fetch failed (unsupported protocol, transport, status, decode, IO).
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The extractor settings are invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The input URL does not parse.
    #[error("invalid URL '{url}'\n  Suggestion: pass a full http(s) URL for the site")]
    InvalidUrl {
        /// The rejected input.
        url: String,
    },

    /// The URL path names a resource kind this extractor cannot resolve.
    #[error(
        "unknown resource kind '{kind}' in '{url}' for extractor '{extractor}'\n  Suggestion: {suggestion}"
    )]
    UnknownResourceKind {
        /// Extractor that rejected the URL.
        extractor: String,
        /// The input URL.
        url: String,
        /// The path segment that was not recognized.
        kind: String,
        /// Which kinds are supported.
        suggestion: String,
    },

    /// No extractor is registered under the requested name.
    #[error("unknown extractor '{name}'\n  Suggestion: use one of: {available}")]
    UnknownExtractor {
        /// The requested name.
        name: String,
        /// Comma-separated list of registered names.
        available: String,
    },

    /// An expected marker or field is missing from a fetched page (site format drift).
    #[error("extraction failed for '{url}': {reason}")]
    Extraction {
        /// The URL being extracted.
        url: String,
        /// What was missing.
        reason: String,
    },

    /// The resource's destination directory could not be created.
    #[error("cannot create directory {path}: {source}\n  Suggestion: remove or rename the existing directory to download again")]
    DirectoryCreate {
        /// Directory that could not be created.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A metadata file could not be written.
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The resource type has no download strategy.
    #[error("download not implemented for {resource}")]
    NotImplemented {
        /// The resource description.
        resource: String,
    },

    /// A spawned child download panicked or was aborted.
    #[error("download task for {target} did not complete: {message}")]
    TaskFailed {
        /// The child target.
        target: String,
        /// Join error description.
        message: String,
    },
}

impl ExtractError {
    /// Creates an `InvalidUrl` error.
    #[must_use]
    pub fn invalid_url(url: &str) -> Self {
        Self::InvalidUrl {
            url: url.to_string(),
        }
    }

    /// Creates an `UnknownResourceKind` error listing the supported kinds.
    #[must_use]
    pub fn unknown_resource_kind(extractor: &str, url: &str, kind: &str, supported: &[&str]) -> Self {
        Self::UnknownResourceKind {
            extractor: extractor.to_string(),
            url: url.to_string(),
            kind: kind.to_string(),
            suggestion: format!("supported kinds are: {}", supported.join(", ")),
        }
    }

    /// Creates an `UnknownExtractor` error.
    #[must_use]
    pub fn unknown_extractor(name: &str, available: &[&str]) -> Self {
        Self::UnknownExtractor {
            name: name.to_string(),
            available: available.join(", "),
        }
    }

    /// Creates an `Extraction` error.
    #[must_use]
    pub fn extraction(url: &str, reason: &str) -> Self {
        Self::Extraction {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Creates a `DirectoryCreate` error.
    pub fn directory_create(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::DirectoryCreate {
            path: path.into(),
            source,
        }
    }

    /// Creates an `Io` error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a `NotImplemented` error.
    #[must_use]
    pub fn not_implemented(resource: &str) -> Self {
        Self::NotImplemented {
            resource: resource.to_string(),
        }
    }
}
