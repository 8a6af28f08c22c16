//! Runtime settings shared by the extractors.
//!
//! There is no config file: the binary fills an [`ExtractorConfig`] from its
//! command-line flags, and library callers build one directly.

use std::time::Duration;

use thiserror::Error;

use crate::fetch::constants::{CONNECT_TIMEOUT_SECS, DEFAULT_REQUEST_DELAY, READ_TIMEOUT_SECS};

/// Minimum allowed concurrency value.
pub const MIN_CONCURRENCY: usize = 1;

/// Maximum allowed concurrency value.
pub const MAX_CONCURRENCY: usize = 100;

/// Default number of in-flight child downloads.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Chapters in this language are downloaded by default when fetching a manga.
pub const DEFAULT_TARGET_LANG: &str = "gb";

/// Default manga API root.
pub const DEFAULT_MANGADEX_API_BASE: &str = "https://mangadex.org/api";

/// Default video site root.
pub const DEFAULT_YOUTUBE_BASE: &str = "https://www.youtube.com";

/// Errors raised when validating an [`ExtractorConfig`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Concurrency outside the supported range.
    #[error(
        "invalid concurrency value {value}: must be between {MIN_CONCURRENCY} and {MAX_CONCURRENCY}"
    )]
    InvalidConcurrency {
        /// The rejected value.
        value: usize,
    },

    /// Target language code is blank.
    #[error("target language code must not be empty")]
    EmptyTargetLang,

    /// A base URL is not an absolute http(s) URL.
    #[error("invalid base URL '{url}': must be an absolute http(s) URL")]
    InvalidBaseUrl {
        /// The rejected URL.
        url: String,
    },
}

/// Settings for fetching and fan-out, shared by every extractor in a registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorConfig {
    /// Delay slept before each API and page request.
    pub request_delay: Duration,
    /// Maximum in-flight child downloads (pages across the run, chapters per manga).
    pub concurrency: usize,
    /// Chapters whose `lang_code` matches are downloaded from a manga.
    pub target_lang: String,
    /// HTTP connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// HTTP read timeout in seconds.
    pub read_timeout_secs: u64,
    /// Manga API root, without trailing slash.
    pub mangadex_api_base: String,
    /// Video site root, without trailing slash.
    pub youtube_base: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            request_delay: DEFAULT_REQUEST_DELAY,
            concurrency: DEFAULT_CONCURRENCY,
            target_lang: DEFAULT_TARGET_LANG.to_string(),
            connect_timeout_secs: CONNECT_TIMEOUT_SECS,
            read_timeout_secs: READ_TIMEOUT_SECS,
            mangadex_api_base: DEFAULT_MANGADEX_API_BASE.to_string(),
            youtube_base: DEFAULT_YOUTUBE_BASE.to_string(),
        }
    }
}

impl ExtractorConfig {
    /// Checks ranges and URLs.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&self.concurrency) {
            return Err(ConfigError::InvalidConcurrency {
                value: self.concurrency,
            });
        }
        if self.target_lang.trim().is_empty() {
            return Err(ConfigError::EmptyTargetLang);
        }
        for base in [&self.mangadex_api_base, &self.youtube_base] {
            let valid = url::Url::parse(base)
                .is_ok_and(|url| matches!(url.scheme(), "http" | "https"));
            if !valid {
                return Err(ConfigError::InvalidBaseUrl { url: base.clone() });
            }
        }
        Ok(())
    }
}
