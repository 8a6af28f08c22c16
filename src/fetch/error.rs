//! Error types for the fetch module.
//!
//! Every variant carries the URL or path it relates to so a failure deep
//! inside a chapter or manga download can still be traced back to the exact
//! request that produced it.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while fetching or consuming an HTTP response.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The URL scheme is neither `http` nor `https`.
    #[error("unsupported protocol '{scheme}' in {url}\n  Suggestion: use an http:// or https:// URL")]
    UnsupportedProtocol {
        /// The rejected URL.
        url: String,
        /// The scheme that was found.
        scheme: String,
    },

    /// The provided URL is malformed.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// Connection or stream failure (DNS, refused connection, TLS, reset mid-body).
    #[error("transport error fetching {url}: {source}")]
    Transport {
        /// The URL being fetched.
        url: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The request or body read exceeded the configured client timeout.
    #[error("timeout fetching {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// The server answered with a non-success status code.
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The body was not valid JSON or did not match the expected shape.
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        /// The URL whose body failed to decode.
        url: String,
        /// The underlying decode error.
        #[source]
        source: serde_json::Error,
    },

    /// The response body was already consumed by an earlier call.
    #[error("response body from {url} was already consumed")]
    BodyConsumed {
        /// The URL whose body is gone.
        url: String,
    },

    /// File system error while writing a downloaded body.
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {source}")]
    ClientBuild {
        /// The underlying builder error.
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    /// Creates an unsupported-protocol error.
    pub fn unsupported_protocol(url: impl Into<String>, scheme: impl Into<String>) -> Self {
        Self::UnsupportedProtocol {
            url: url.into(),
            scheme: scheme.into(),
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates a transport error, promoting reqwest timeouts to [`FetchError::Timeout`].
    pub fn transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout { url: url.into() }
        } else {
            Self::Transport {
                url: url.into(),
                source,
            }
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a decode error.
    pub fn decode(url: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decode {
            url: url.into(),
            source,
        }
    }

    /// Creates a body-consumed error.
    pub fn body_consumed(url: impl Into<String>) -> Self {
        Self::BodyConsumed { url: url.into() }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

// No `From<reqwest::Error>` / `From<std::io::Error>`: every variant needs the
// url or path, which the source errors don't carry.
