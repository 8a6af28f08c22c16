//! HTTP fetcher with an optional per-call pre-request delay.
//!
//! This module provides the [`Fetcher`] struct which issues GET requests and
//! hands back a lazy [`FetchResponse`]; nothing is read from the body until
//! the caller asks for text, JSON or a file download.

use std::time::Duration;

use reqwest::{Client, ClientBuilder};
use tracing::{debug, instrument};
use url::Url;

use super::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use super::error::FetchError;
use super::response::FetchResponse;
use crate::user_agent;

/// Per-call fetch options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Time to sleep before the request is issued.
    ///
    /// This is a crude per-call throttle, not a shared rate limiter: concurrent
    /// calls each sleep on their own and do not serialize against each other.
    pub delay: Option<Duration>,
}

impl FetchOptions {
    /// Options with no delay.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Options that sleep for `delay` before issuing the request.
    ///
    /// A zero delay is treated as no delay.
    #[must_use]
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: (!delay.is_zero()).then_some(delay),
        }
    }
}

/// HTTP client for site extractors.
///
/// Created once per run and shared (it is cheap to clone) so every request
/// reuses the same connection pool.
///
/// # Example
///
/// ```no_run
/// use extractdl_core::fetch::{FetchOptions, Fetcher};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let fetcher = Fetcher::new()?;
/// let response = fetcher
///     .fetch("https://example.com/api/chapter/1", &FetchOptions::new())
///     .await?;
/// let body: serde_json::Value = response.json().await?;
/// println!("{body}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Creates a fetcher with default timeouts (30s connect, 5min read).
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::ClientBuild`] if the HTTP client cannot be built.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeouts(CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
    }

    /// Creates a fetcher with explicit timeout values.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::ClientBuild`] if the HTTP client cannot be built.
    #[instrument(level = "debug")]
    pub fn with_timeouts(
        connect_timeout_secs: u64,
        read_timeout_secs: u64,
    ) -> Result<Self, FetchError> {
        let client = base_client_builder(connect_timeout_secs, read_timeout_secs)
            .build()
            .map_err(|source| FetchError::ClientBuild { source })?;
        Ok(Self { client })
    }

    /// Issues a GET request for `url` and returns the unread response.
    ///
    /// The scheme is checked before anything else, so an unsupported URL
    /// never sleeps and never touches the network.
    ///
    /// # Errors
    ///
    /// - [`FetchError::InvalidUrl`] if `url` does not parse
    /// - [`FetchError::UnsupportedProtocol`] for schemes other than http/https
    /// - [`FetchError::Transport`] / [`FetchError::Timeout`] if the request fails
    /// - [`FetchError::HttpStatus`] if the server answers with a non-2xx status
    #[instrument(skip(self, options), fields(url = %url))]
    pub async fn fetch(
        &self,
        url: &str,
        options: &FetchOptions,
    ) -> Result<FetchResponse, FetchError> {
        let parsed = Url::parse(url).map_err(|_| FetchError::invalid_url(url))?;
        check_protocol(&parsed)?;

        if let Some(delay) = options.delay {
            debug!(delay_ms = delay.as_millis(), "delaying request");
            tokio::time::sleep(delay).await;
        }

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| FetchError::transport(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::http_status(url, status.as_u16()));
        }

        debug!(status = status.as_u16(), "response received");
        Ok(FetchResponse::new(url, response))
    }
}

fn check_protocol(url: &Url) -> Result<(), FetchError> {
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(FetchError::unsupported_protocol(url.as_str(), other)),
    }
}

fn base_client_builder(connect_timeout_secs: u64, read_timeout_secs: u64) -> ClientBuilder {
    Client::builder()
        .connect_timeout(Duration::from_secs(connect_timeout_secs))
        .timeout(Duration::from_secs(read_timeout_secs))
        .gzip(true)
        .user_agent(user_agent::default_user_agent())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::time::Instant;

    use crate::test_support::socket_guard::start_mock_server_or_skip;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, ResponseTemplate};

    #[test]
    fn test_fetch_options_zero_delay_is_none() {
        assert_eq!(FetchOptions::with_delay(Duration::ZERO), FetchOptions::new());
        assert_eq!(
            FetchOptions::with_delay(Duration::from_millis(5)).delay,
            Some(Duration::from_millis(5))
        );
    }

    #[test]
    fn test_fetch_rejects_unsupported_protocol_without_delay() {
        let fetcher = Fetcher::new().unwrap();
        let options = FetchOptions::with_delay(Duration::from_secs(30));

        let started = Instant::now();
        let result = tokio_test::block_on(fetcher.fetch("ftp://example.com/file.jpg", &options));

        assert!(matches!(
            result,
            Err(FetchError::UnsupportedProtocol { ref scheme, .. }) if scheme == "ftp"
        ));
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_fetch_rejects_invalid_url() {
        let fetcher = Fetcher::new().unwrap();
        let result = tokio_test::block_on(fetcher.fetch("not a url", &FetchOptions::new()));
        assert!(matches!(result, Err(FetchError::InvalidUrl { .. })));
    }

    #[tokio::test]
    async fn test_fetch_success_returns_lazy_response() {
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let fetcher = Fetcher::new().unwrap();
        let url = format!("{}/page", mock_server.uri());
        let response = fetcher.fetch(&url, &FetchOptions::new()).await.unwrap();

        assert_eq!(response.status(), 200);
        assert_eq!(response.url(), url);
        assert_eq!(response.content_length(), Some(5));
        assert_eq!(response.text().await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_fetch_non_success_status_is_error() {
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let fetcher = Fetcher::new().unwrap();
        let url = format!("{}/missing", mock_server.uri());
        let result = fetcher.fetch(&url, &FetchOptions::new()).await;

        assert!(matches!(
            result,
            Err(FetchError::HttpStatus { status: 404, .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_waits_for_configured_delay() {
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;

        let fetcher = Fetcher::new().unwrap();
        let url = format!("{}/slow", mock_server.uri());
        let options = FetchOptions::with_delay(Duration::from_millis(150));

        let started = Instant::now();
        fetcher.fetch(&url, &options).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(150));
    }

    #[tokio::test]
    async fn test_fetch_delays_do_not_serialize_concurrent_calls() {
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;

        let fetcher = Fetcher::new().unwrap();
        let first = format!("{}/a", mock_server.uri());
        let second = format!("{}/b", mock_server.uri());
        let options = FetchOptions::with_delay(Duration::from_millis(300));

        let started = Instant::now();
        let (a, b) = tokio::join!(
            fetcher.fetch(&first, &options),
            fetcher.fetch(&second, &options)
        );
        a.unwrap();
        b.unwrap();
        assert!(
            started.elapsed() < Duration::from_millis(590),
            "delays should overlap, took {:?}",
            started.elapsed()
        );
    }
}
