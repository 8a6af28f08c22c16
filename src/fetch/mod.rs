//! HTTP fetch layer with lazy, single-read response bodies.
//!
//! This module provides the [`Fetcher`] used by every site extractor. A fetch
//! returns a [`FetchResponse`] whose body is only read when the caller asks for
//! it, either buffered (`text`/`json`) for API and page responses or streamed
//! straight to disk (`download`) for images and media.
//!
//! # Features
//!
//! - Optional per-call pre-request delay ([`FetchOptions::delay`])
//! - Scheme check before any network I/O (`http`/`https` only)
//! - Non-2xx responses rejected as [`FetchError::HttpStatus`]
//! - Body consumed at most once, with memoized text
//! - Partial files removed when a streamed download fails
//!
//! # Example
//!
//! ```no_run
//! use extractdl_core::fetch::{FetchOptions, Fetcher};
//! use std::path::Path;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = Fetcher::new()?;
//! let options = FetchOptions::with_delay(Duration::from_millis(500));
//! let response = fetcher.fetch("https://example.com/page.jpg", &options).await?;
//! let bytes = response.download(Path::new("./0.jpg")).await?;
//! println!("wrote {bytes} bytes");
//! # Ok(())
//! # }
//! ```

mod client;
pub mod constants;
mod error;
mod response;

pub use client::{FetchOptions, Fetcher};
pub use error::FetchError;
pub use response::FetchResponse;
