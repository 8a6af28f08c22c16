//! Manga site extractor: titles and chapters from the JSON API.
//!
//! URL shapes:
//! - `https://mangadex.org/title/<id>[/...]` → [`MangaResource`]
//! - `https://mangadex.org/chapter/<id>[/...]` → [`ChapterResource`]
//!
//! A manga's chapters are resolved only when the manga is downloaded, through
//! the same [`MangadexApi::chapter`] call a chapter URL goes through.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use tokio::sync::Semaphore;
use tracing::{debug, info, instrument};

use super::utils::{join_url, parse_input_url, path_kind_and_id};
use super::{ExtractError, Extractor};
use crate::config::ExtractorConfig;
use crate::fetch::{FetchError, FetchOptions, Fetcher};
use crate::resource::batch::{ChildJob, run_bounded};
use crate::resource::{DownloadReport, Resource, create_resource_dir, naming};

const EXTRACTOR_NAME: &str = "mangadex";
const RESOURCE_KINDS: &[&str] = &["title", "chapter"];

/// Sidecar file written into every chapter directory.
pub const META_FILE_NAME: &str = "meta.json";

/// Chapter record from `GET <api-base>/chapter/<id>`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChapterMetadata {
    /// Volume number as published (may be empty).
    #[serde(deserialize_with = "string_or_number")]
    pub volume: String,
    /// Chapter number as published.
    #[serde(deserialize_with = "string_or_number")]
    pub chapter: String,
    /// Image server root.
    pub server: String,
    /// Chapter hash, the directory of the images on the server.
    pub hash: String,
    /// Page image file names, in reading order.
    pub page_array: Vec<String>,
    /// Chapter title.
    #[serde(default)]
    pub title: Option<String>,
    /// Language of the scanlation.
    #[serde(default)]
    pub lang_code: Option<String>,
}

/// Manga record from `GET <api-base>/manga/<id>`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MangaMetadata {
    /// Title information.
    pub manga: MangaInfo,
    /// Chapter summaries keyed by chapter id.
    #[serde(default)]
    pub chapter: BTreeMap<String, ChapterSummary>,
}

/// The `manga` object of a manga record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MangaInfo {
    /// Display title.
    pub title: String,
}

/// One entry of a manga's chapter map.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChapterSummary {
    /// Language of the scanlation.
    #[serde(default)]
    pub lang_code: String,
    /// Chapter title.
    #[serde(default)]
    pub title: Option<String>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
    })
}

/// API access shared by the extractor and every resource it produces.
#[derive(Debug)]
pub struct MangadexApi {
    fetcher: Fetcher,
    api_base: String,
    options: FetchOptions,
    target_lang: String,
    concurrency: usize,
    page_permits: Arc<Semaphore>,
}

impl MangadexApi {
    /// Creates the API handle; page downloads across all chapters share one
    /// pool of `config.concurrency` permits.
    #[must_use]
    pub fn new(fetcher: Fetcher, config: &ExtractorConfig) -> Self {
        Self {
            fetcher,
            api_base: config.mangadex_api_base.trim_end_matches('/').to_string(),
            options: FetchOptions::with_delay(config.request_delay),
            target_lang: config.target_lang.clone(),
            concurrency: config.concurrency,
            page_permits: Arc::new(Semaphore::new(config.concurrency)),
        }
    }

    /// Resolves a chapter id to its resource.
    ///
    /// # Errors
    ///
    /// Returns fetch errors, including [`FetchError::Decode`] when the record
    /// lacks a required field.
    #[instrument(skip(self), fields(extractor = EXTRACTOR_NAME))]
    pub async fn chapter(self: &Arc<Self>, id: &str) -> Result<ChapterResource, ExtractError> {
        let url = join_url(&self.api_base, &["chapter", id]);
        let (data, raw) = self.fetch_record::<ChapterMetadata>(&url).await?;
        debug!(
            volume = %data.volume,
            chapter = %data.chapter,
            pages = data.page_array.len(),
            "chapter resolved"
        );
        Ok(ChapterResource {
            id: id.to_string(),
            data,
            raw,
            api: Arc::clone(self),
        })
    }

    /// Resolves a manga id to its resource. Chapters are not fetched here.
    ///
    /// # Errors
    ///
    /// Returns fetch errors, including [`FetchError::Decode`] when the record
    /// lacks a required field.
    #[instrument(skip(self), fields(extractor = EXTRACTOR_NAME))]
    pub async fn manga(self: &Arc<Self>, id: &str) -> Result<MangaResource, ExtractError> {
        let url = join_url(&self.api_base, &["manga", id]);
        let (data, _raw) = self.fetch_record::<MangaMetadata>(&url).await?;
        debug!(
            title = %data.manga.title,
            chapters = data.chapter.len(),
            "manga resolved"
        );
        Ok(MangaResource {
            id: id.to_string(),
            data,
            api: Arc::clone(self),
        })
    }

    /// Fetches `url` and decodes it twice: raw for the sidecar, typed for use.
    async fn fetch_record<T: DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<(T, serde_json::Value), FetchError> {
        let response = self.fetcher.fetch(url, &self.options).await?;
        let raw: serde_json::Value = response.json().await?;
        let typed = T::deserialize(&raw).map_err(|e| FetchError::decode(url, e))?;
        Ok((typed, raw))
    }
}

/// A chapter: metadata plus its page images.
#[derive(Debug)]
pub struct ChapterResource {
    id: String,
    data: ChapterMetadata,
    raw: serde_json::Value,
    api: Arc<MangadexApi>,
}

impl ChapterResource {
    /// The chapter id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The decoded chapter record.
    #[must_use]
    pub fn data(&self) -> &ChapterMetadata {
        &self.data
    }

    /// The raw API response, as written to `meta.json`.
    #[must_use]
    pub fn raw(&self) -> &serde_json::Value {
        &self.raw
    }

    /// Name of the directory this chapter downloads into.
    #[must_use]
    pub fn dir_name(&self) -> String {
        naming::chapter_dir_name(
            &self.data.volume,
            &self.data.chapter,
            self.data.title.as_deref(),
        )
    }

    /// Image URL of every page, in order.
    #[must_use]
    pub fn page_urls(&self) -> Vec<String> {
        self.data
            .page_array
            .iter()
            .map(|file| join_url(&self.data.server, &[&self.data.hash, file]))
            .collect()
    }

    /// Downloads the chapter into a new directory under `destination`.
    ///
    /// Writes `meta.json` first, then every page as `<index><ext>`, with at
    /// most `concurrency` pages in flight across the whole run.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::DirectoryCreate`] if the chapter directory
    /// cannot be created (including when it already exists); nothing is
    /// written in that case. Page and sidecar failures go into the report.
    #[instrument(skip(self), fields(chapter_id = %self.id))]
    pub async fn download(&self, destination: &Path) -> Result<DownloadReport, ExtractError> {
        let dir = destination.join(self.dir_name());
        create_resource_dir(&dir).await?;
        info!(dir = %dir.display(), pages = self.data.page_array.len(), "downloading chapter");

        let mut report = DownloadReport::new();
        let meta_path = dir.join(META_FILE_NAME);
        match write_sidecar(&meta_path, &self.raw).await {
            Ok(()) => report.record_file(meta_path),
            Err(error) => report.record_failure(meta_path.display().to_string(), error),
        }

        let jobs = self
            .page_urls()
            .into_iter()
            .zip(&self.data.page_array)
            .enumerate()
            .map(|(index, (url, file))| {
                let target = dir.join(naming::page_file_name(index, file));
                let fetcher = self.api.fetcher.clone();
                let options = self.api.options;
                ChildJob::new(target.display().to_string(), async move {
                    let response = fetcher.fetch(&url, &options).await?;
                    response.download(&target).await?;
                    let mut page = DownloadReport::new();
                    page.record_file(target);
                    Ok::<_, ExtractError>(page)
                })
            })
            .collect();

        report.merge(run_bounded(&self.api.page_permits, jobs).await);
        info!(
            dir = %dir.display(),
            files = report.files().len(),
            failures = report.failures().len(),
            "chapter download finished"
        );
        Ok(report)
    }
}

/// A manga title; its chapters are resolved when it is downloaded.
#[derive(Debug)]
pub struct MangaResource {
    id: String,
    data: MangaMetadata,
    api: Arc<MangadexApi>,
}

impl MangaResource {
    /// The manga id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The decoded manga record.
    #[must_use]
    pub fn data(&self) -> &MangaMetadata {
        &self.data
    }

    /// Name of the directory this manga downloads into.
    #[must_use]
    pub fn dir_name(&self) -> String {
        naming::manga_dir_name(&self.data.manga.title)
    }

    /// Ids of the chapters in the configured target language.
    #[must_use]
    pub fn selected_chapter_ids(&self) -> Vec<&str> {
        self.data
            .chapter
            .iter()
            .filter(|(_, summary)| summary.lang_code == self.api.target_lang)
            .map(|(id, _)| id.as_str())
            .collect()
    }

    /// Downloads every chapter in the target language under a new directory.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::DirectoryCreate`] if the manga directory cannot
    /// be created. Chapter resolution and download failures go into the report.
    #[instrument(skip(self), fields(manga_id = %self.id))]
    pub async fn download(&self, destination: &Path) -> Result<DownloadReport, ExtractError> {
        let dir = destination.join(self.dir_name());
        create_resource_dir(&dir).await?;

        let selected = self.selected_chapter_ids();
        info!(
            dir = %dir.display(),
            selected = selected.len(),
            skipped = self.data.chapter.len() - selected.len(),
            lang = %self.api.target_lang,
            "downloading manga"
        );

        let jobs = selected
            .into_iter()
            .map(|id| {
                let api = Arc::clone(&self.api);
                let id = id.to_string();
                let dir = dir.clone();
                ChildJob::new(format!("chapter {id}"), async move {
                    let chapter = api.chapter(&id).await?;
                    chapter.download(&dir).await
                })
            })
            .collect();

        let chapter_permits = Arc::new(Semaphore::new(self.api.concurrency));
        let report = run_bounded(&chapter_permits, jobs).await;
        info!(
            dir = %dir.display(),
            files = report.files().len(),
            failures = report.failures().len(),
            "manga download finished"
        );
        Ok(report)
    }
}

async fn write_sidecar(path: &Path, raw: &serde_json::Value) -> Result<(), ExtractError> {
    let body = serde_json::to_vec(raw).map_err(|e| ExtractError::io(path, std::io::Error::other(e)))?;
    tokio::fs::write(path, body)
        .await
        .map_err(|e| ExtractError::io(path, e))
}

/// Extractor for the manga site.
#[derive(Debug)]
pub struct MangadexExtractor {
    api: Arc<MangadexApi>,
}

impl MangadexExtractor {
    /// Creates the extractor with its own API handle.
    #[must_use]
    pub fn new(fetcher: Fetcher, config: &ExtractorConfig) -> Self {
        Self {
            api: Arc::new(MangadexApi::new(fetcher, config)),
        }
    }
}

#[async_trait]
impl Extractor for MangadexExtractor {
    fn name(&self) -> &'static str {
        EXTRACTOR_NAME
    }

    fn resource_kinds(&self) -> &'static [&'static str] {
        RESOURCE_KINDS
    }

    #[tracing::instrument(skip(self), fields(extractor = EXTRACTOR_NAME, url = %url))]
    async fn resolve(&self, url: &str) -> Result<Resource, ExtractError> {
        let parsed = parse_input_url(url)?;
        let (kind, id) = path_kind_and_id(&parsed);

        let require_id = || {
            id.ok_or_else(|| ExtractError::extraction(url, "URL path has no resource id"))
        };
        match kind {
            Some("title") => Ok(Resource::Manga(self.api.manga(require_id()?).await?)),
            Some("chapter") => Ok(Resource::Chapter(self.api.chapter(require_id()?).await?)),
            other => Err(ExtractError::unknown_resource_kind(
                EXTRACTOR_NAME,
                url,
                other.unwrap_or_default(),
                RESOURCE_KINDS,
            )),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_api() -> Arc<MangadexApi> {
        Arc::new(MangadexApi::new(
            Fetcher::new().unwrap(),
            &ExtractorConfig::default(),
        ))
    }

    #[test]
    fn test_chapter_metadata_accepts_numeric_fields() {
        let data: ChapterMetadata = serde_json::from_value(json!({
            "volume": 3,
            "chapter": 12.5,
            "server": "https://s.example",
            "hash": "abc",
            "page_array": ["001.jpg"],
        }))
        .unwrap();
        assert_eq!(data.volume, "3");
        assert_eq!(data.chapter, "12.5");
        assert_eq!(data.title, None);
    }

    #[test]
    fn test_chapter_metadata_missing_hash_fails() {
        let result = serde_json::from_value::<ChapterMetadata>(json!({
            "volume": "1",
            "chapter": "1",
            "server": "https://s.example",
            "page_array": [],
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_chapter_page_urls_join_server_hash_and_file() {
        let chapter = ChapterResource {
            id: "1".to_string(),
            data: ChapterMetadata {
                volume: "1".to_string(),
                chapter: "5".to_string(),
                server: "https://s.example/".to_string(),
                hash: "abc".to_string(),
                page_array: vec!["001.jpg".to_string(), "002.png".to_string()],
                title: Some("Foo Bar!".to_string()),
                lang_code: None,
            },
            raw: json!({}),
            api: test_api(),
        };
        assert_eq!(
            chapter.page_urls(),
            vec![
                "https://s.example/abc/001.jpg".to_string(),
                "https://s.example/abc/002.png".to_string()
            ]
        );
        assert_eq!(chapter.dir_name(), "vol-1_ch-5_-_foo_bar");
    }

    #[test]
    fn test_manga_selects_only_target_language() {
        let data: MangaMetadata = serde_json::from_value(json!({
            "manga": { "title": "Some Manga" },
            "chapter": {
                "10": { "lang_code": "gb" },
                "11": { "lang_code": "fr" },
                "12": { "lang_code": "gb", "title": "Finale" },
                "13": {}
            }
        }))
        .unwrap();
        let manga = MangaResource {
            id: "7".to_string(),
            data,
            api: test_api(),
        };
        assert_eq!(manga.selected_chapter_ids(), vec!["10", "12"]);
        assert_eq!(manga.dir_name(), "some_manga");
    }

    #[tokio::test]
    async fn test_resolve_unknown_kind_fails_before_network() {
        let extractor = MangadexExtractor::new(Fetcher::new().unwrap(), &ExtractorConfig::default());
        let result = extractor.resolve("https://mangadex.org/group/99").await;
        assert!(matches!(
            result,
            Err(ExtractError::UnknownResourceKind { ref kind, .. }) if kind == "group"
        ));
    }

    #[tokio::test]
    async fn test_resolve_missing_id_is_extraction_error() {
        let extractor = MangadexExtractor::new(Fetcher::new().unwrap(), &ExtractorConfig::default());
        let result = extractor.resolve("https://mangadex.org/chapter/").await;
        assert!(matches!(result, Err(ExtractError::Extraction { .. })));
    }
}
