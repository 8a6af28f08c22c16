//! Resources produced by extractors and their download reports.
//!
//! A [`Resource`] is what an extractor returns for a URL: typed metadata plus
//! a `download` operation. Container resources (a manga) discover their
//! children only when `download` runs, resolving each one through the same
//! path a top-level URL would take.
//!
//! # Example
//!
//! ```no_run
//! use extractdl_core::{ExtractorConfig, build_default_registry};
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = build_default_registry(&ExtractorConfig::default())?;
//! let resource = registry
//!     .resolve("mangadex", "https://mangadex.org/chapter/12345")
//!     .await?;
//! let report = resource.download(Path::new("./")).await?;
//! println!("{} files, {} failures", report.files().len(), report.failures().len());
//! # Ok(())
//! # }
//! ```

pub(crate) mod batch;
pub mod naming;

use std::path::{Path, PathBuf};

use tracing::{instrument, warn};

use crate::extractor::ExtractError;
use crate::extractor::mangadex::{ChapterResource, MangaResource};
use crate::extractor::youtube::VideoResource;

/// A resolved, downloadable resource.
#[derive(Debug)]
pub enum Resource {
    /// A video with its formats grouped by media type.
    Video(VideoResource),
    /// A manga title; chapters are resolved on download.
    Manga(MangaResource),
    /// A single chapter with its page images.
    Chapter(ChapterResource),
}

impl Resource {
    /// Short name of the resource kind (`video`, `manga`, `chapter`).
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Video(_) => "video",
            Self::Manga(_) => "manga",
            Self::Chapter(_) => "chapter",
        }
    }

    /// Downloads the resource (and any children) under `destination`.
    ///
    /// # Errors
    ///
    /// Fails as a whole only when the resource itself cannot start: its
    /// directory cannot be created, or the resource kind has no download
    /// strategy. Child failures are collected in the returned report instead.
    #[instrument(skip(self), fields(kind = self.kind(), destination = %destination.display()))]
    pub async fn download(&self, destination: &Path) -> Result<DownloadReport, ExtractError> {
        match self {
            Self::Video(video) => video.download(destination).await,
            Self::Manga(manga) => manga.download(destination).await,
            Self::Chapter(chapter) => chapter.download(destination).await,
        }
    }
}

/// A child download that failed, kept so no error disappears silently.
#[derive(Debug)]
pub struct ChildFailure {
    /// What the child was writing or resolving (a file path or chapter id).
    pub target: String,
    /// Why it failed.
    pub error: ExtractError,
}

/// Outcome of a [`Resource::download`] call.
///
/// Lists every file written and every child that failed. Reports from nested
/// resources are merged into their parent's.
#[derive(Debug, Default)]
pub struct DownloadReport {
    files: Vec<PathBuf>,
    failures: Vec<ChildFailure>,
}

impl DownloadReport {
    /// Creates an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Files written, in completion order.
    #[must_use]
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Child failures, in completion order.
    #[must_use]
    pub fn failures(&self) -> &[ChildFailure] {
        &self.failures
    }

    /// Returns true if no child failed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub(crate) fn record_file(&mut self, path: PathBuf) {
        self.files.push(path);
    }

    pub(crate) fn record_failure(&mut self, target: impl Into<String>, error: ExtractError) {
        let target = target.into();
        warn!(child = %target, error = %error, "child download failed");
        self.failures.push(ChildFailure { target, error });
    }

    pub(crate) fn merge(&mut self, other: DownloadReport) {
        self.files.extend(other.files);
        self.failures.extend(other.failures);
    }
}

/// Creates the single directory a resource downloads into.
///
/// Fails if the directory already exists: an existing directory is never
/// treated as a partial download to resume.
pub(crate) async fn create_resource_dir(path: &Path) -> Result<(), ExtractError> {
    let mut builder = tokio::fs::DirBuilder::new();
    #[cfg(unix)]
    builder.mode(0o755);
    builder
        .create(path)
        .await
        .map_err(|e| ExtractError::directory_create(path, e))
}
