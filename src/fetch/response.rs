//! Lazy response handle with single-read body semantics.
//!
//! A [`FetchResponse`] wraps an unread `reqwest::Response`. The body stream is
//! not rewindable, so every terminal operation goes through one state machine
//! and the stream is drained at most once:
//!
//! - `text()`/`json()` buffer the body and keep it for later calls
//! - `download()` streams the body to disk and records where it went
//! - a failed read leaves the body consumed

use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use serde::de::DeserializeOwned;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use super::error::FetchError;

#[derive(Debug)]
enum BodyState {
    /// Stream not touched yet.
    Pending(reqwest::Response),
    /// Fully read into memory by `text()`/`json()`.
    Buffered(Vec<u8>),
    /// Streamed straight to a file by `download()`.
    Downloaded { path: PathBuf, bytes: u64 },
    /// Lost to a failed read.
    Consumed,
}

/// Response handle returned by [`Fetcher::fetch`](super::Fetcher::fetch).
#[derive(Debug)]
pub struct FetchResponse {
    url: String,
    status: u16,
    content_length: Option<u64>,
    body: Mutex<BodyState>,
}

impl FetchResponse {
    pub(crate) fn new(url: impl Into<String>, response: reqwest::Response) -> Self {
        Self {
            url: url.into(),
            status: response.status().as_u16(),
            content_length: response.content_length(),
            body: Mutex::new(BodyState::Pending(response)),
        }
    }

    /// The URL this response was fetched from.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The HTTP status code.
    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    /// The `Content-Length` announced by the server, if any.
    #[must_use]
    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    /// Reads the whole body as a string.
    ///
    /// The first call drains the stream; later calls return the same text.
    /// Invalid UTF-8 sequences are replaced rather than rejected.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Transport`] if the stream fails before completion
    /// - [`FetchError::BodyConsumed`] if the body was streamed to a file or lost
    ///   to an earlier failure
    pub async fn text(&self) -> Result<String, FetchError> {
        let mut state = self.body.lock().await;
        let bytes = self.buffer(&mut state).await?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    /// Reads the whole body and decodes it as JSON into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Decode`] on malformed or mismatched JSON, and the
    /// same errors as [`text`](Self::text) otherwise.
    pub async fn json<T: DeserializeOwned>(&self) -> Result<T, FetchError> {
        let mut state = self.body.lock().await;
        let bytes = self.buffer(&mut state).await?;
        serde_json::from_slice(bytes).map_err(|e| FetchError::decode(&self.url, e))
    }

    /// Streams the body to `destination` without holding it in memory.
    ///
    /// Resolves once the file is written, flushed and closed, returning the
    /// number of bytes written. A partially written file is removed on failure.
    /// Calling again for the same destination returns the recorded size.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Transport`] if the stream fails mid-body
    /// - [`FetchError::Io`] if the file cannot be created or written
    /// - [`FetchError::BodyConsumed`] if the body already went to another file
    #[instrument(skip(self), fields(url = %self.url, path = %destination.display()))]
    pub async fn download(&self, destination: &Path) -> Result<u64, FetchError> {
        let mut state = self.body.lock().await;
        match std::mem::replace(&mut *state, BodyState::Consumed) {
            BodyState::Pending(response) => {
                let bytes = stream_to_file(response, &self.url, destination).await?;
                *state = BodyState::Downloaded {
                    path: destination.to_path_buf(),
                    bytes,
                };
                debug!(bytes, "download complete");
                Ok(bytes)
            }
            BodyState::Buffered(body) => {
                let result = tokio::fs::write(destination, &body)
                    .await
                    .map_err(|e| FetchError::io(destination, e));
                let bytes = body.len() as u64;
                *state = BodyState::Buffered(body);
                result.map(|()| bytes)
            }
            BodyState::Downloaded { path, bytes } => {
                let same_target = path == destination;
                *state = BodyState::Downloaded { path, bytes };
                if same_target {
                    Ok(bytes)
                } else {
                    Err(FetchError::body_consumed(&self.url))
                }
            }
            BodyState::Consumed => Err(FetchError::body_consumed(&self.url)),
        }
    }

    async fn buffer<'a>(&self, state: &'a mut BodyState) -> Result<&'a [u8], FetchError> {
        if matches!(state, BodyState::Pending(_))
            && let BodyState::Pending(response) = std::mem::replace(state, BodyState::Consumed)
        {
            *state = BodyState::Buffered(read_body(response, &self.url).await?);
        }

        match state {
            BodyState::Buffered(bytes) => Ok(bytes.as_slice()),
            _ => Err(FetchError::body_consumed(&self.url)),
        }
    }
}

async fn read_body(response: reqwest::Response, url: &str) -> Result<Vec<u8>, FetchError> {
    let mut body = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| FetchError::transport(url, e))?;
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

async fn stream_to_file(
    response: reqwest::Response,
    url: &str,
    path: &Path,
) -> Result<u64, FetchError> {
    let file = File::create(path)
        .await
        .map_err(|e| FetchError::io(path, e))?;

    let result = write_stream(file, response, url, path).await;
    if result.is_err() {
        debug!(path = %path.display(), "cleaning up partial file after error");
        let _ = tokio::fs::remove_file(path).await;
    }
    result
}

async fn write_stream(
    file: File,
    response: reqwest::Response,
    url: &str,
    path: &Path,
) -> Result<u64, FetchError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| FetchError::transport(url, e))?;
        writer
            .write_all(&chunk)
            .await
            .map_err(|e| FetchError::io(path, e))?;
        bytes_written += chunk.len() as u64;
    }

    writer.flush().await.map_err(|e| FetchError::io(path, e))?;
    writer
        .into_inner()
        .sync_all()
        .await
        .map_err(|e| FetchError::io(path, e))?;

    Ok(bytes_written)
}
