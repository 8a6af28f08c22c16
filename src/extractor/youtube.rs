//! Video site extractor: adaptive formats from the watch page.
//!
//! Only `watch?v=<id>` URLs resolve. The watch page embeds its player config
//! as a JSON object assigned to `ytplayer.config`; the `args.adaptive_fmts`
//! field of that object is a comma-separated list of form-encoded format
//! descriptors, which are grouped by media type into a [`VideoFormatGroup`].

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

use super::utils::{compile_static_regex, parse_input_url, path_kind_and_id};
use super::{ExtractError, Extractor};
use crate::config::ExtractorConfig;
use crate::fetch::{FetchError, FetchOptions, Fetcher};
use crate::resource::{DownloadReport, Resource};

const EXTRACTOR_NAME: &str = "youtube";
const RESOURCE_KINDS: &[&str] = &["watch"];

static PLAYER_CONFIG_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(r"ytplayer\.config = (.*);ytplayer\.load = function")
});

#[derive(Debug, Deserialize)]
struct PlayerConfig {
    args: PlayerArgs,
}

#[derive(Debug, Deserialize)]
struct PlayerArgs {
    #[serde(default)]
    adaptive_fmts: Option<String>,
}

/// One adaptive format: its MIME type, size, and every raw key/value pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatDescriptor {
    /// Full MIME type including codecs, e.g. `video/mp4; codecs="avc1.640028"`.
    pub mime_type: String,
    /// Size in bytes from `clen`; 0 when absent or not a number.
    pub content_length: u64,
    /// All decoded fields of the descriptor.
    pub fields: BTreeMap<String, String>,
}

impl FormatDescriptor {
    /// The coarse media type: the MIME type before the slash.
    #[must_use]
    pub fn media_type(&self) -> &str {
        self.mime_type
            .split('/')
            .next()
            .unwrap_or_default()
            .trim()
    }

    /// Raw field lookup.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    fn parse(page_url: &str, encoded: &str) -> Result<Self, ExtractError> {
        let fields: BTreeMap<String, String> = url::form_urlencoded::parse(encoded.as_bytes())
            .into_owned()
            .collect();
        let mime_type = fields
            .get("type")
            .cloned()
            .ok_or_else(|| ExtractError::extraction(page_url, "format descriptor has no type"))?;
        let content_length = fields
            .get("clen")
            .and_then(|clen| clen.trim().parse().ok())
            .unwrap_or(0);
        Ok(Self {
            mime_type,
            content_length,
            fields,
        })
    }
}

/// Formats grouped by media type, each group largest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoFormatGroup {
    groups: BTreeMap<String, Vec<FormatDescriptor>>,
}

impl VideoFormatGroup {
    /// Groups `formats` by media type and sorts each group by descending size.
    ///
    /// The sort is stable, so equal sizes keep page order.
    #[must_use]
    pub fn from_formats(formats: impl IntoIterator<Item = FormatDescriptor>) -> Self {
        let mut groups: BTreeMap<String, Vec<FormatDescriptor>> = BTreeMap::new();
        for format in formats {
            groups
                .entry(format.media_type().to_string())
                .or_default()
                .push(format);
        }
        for group in groups.values_mut() {
            group.sort_by(|a, b| b.content_length.cmp(&a.content_length));
        }
        Self { groups }
    }

    /// Formats of one media type, largest first.
    #[must_use]
    pub fn get(&self, media_type: &str) -> Option<&[FormatDescriptor]> {
        self.groups.get(media_type).map(Vec::as_slice)
    }

    /// The largest format of one media type.
    #[must_use]
    pub fn best(&self, media_type: &str) -> Option<&FormatDescriptor> {
        self.get(media_type).and_then(<[FormatDescriptor]>::first)
    }

    /// Media types present, in sorted order.
    pub fn media_types(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Iterates over `(media type, formats)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[FormatDescriptor])> {
        self.groups
            .iter()
            .map(|(media_type, formats)| (media_type.as_str(), formats.as_slice()))
    }

    /// Returns true if no formats were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// A video and its grouped formats.
#[derive(Debug)]
pub struct VideoResource {
    id: String,
    data: VideoFormatGroup,
}

impl VideoResource {
    /// The video id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The grouped formats.
    #[must_use]
    pub fn data(&self) -> &VideoFormatGroup {
        &self.data
    }

    /// Video download has no strategy yet; reports so instead of writing nothing.
    ///
    /// # Errors
    ///
    /// Always returns [`ExtractError::NotImplemented`].
    #[allow(clippy::unused_async)]
    pub async fn download(&self, destination: &Path) -> Result<DownloadReport, ExtractError> {
        debug!(video_id = %self.id, destination = %destination.display(), "video download requested");
        Err(ExtractError::not_implemented(&format!("video {}", self.id)))
    }
}

/// Extractor for the video site.
#[derive(Debug)]
pub struct YoutubeExtractor {
    fetcher: Fetcher,
    base_url: String,
    options: FetchOptions,
}

impl YoutubeExtractor {
    /// Creates the extractor. Watch pages are fetched without a delay.
    #[must_use]
    pub fn new(fetcher: Fetcher, config: &ExtractorConfig) -> Self {
        Self {
            fetcher,
            base_url: config.youtube_base.trim_end_matches('/').to_string(),
            options: FetchOptions::new(),
        }
    }

    #[instrument(skip(self), fields(extractor = EXTRACTOR_NAME))]
    async fn video(&self, id: &str) -> Result<VideoResource, ExtractError> {
        let mut page_url = Url::parse(&format!("{}/watch", self.base_url))
            .map_err(|_| ExtractError::invalid_url(&self.base_url))?;
        page_url.query_pairs_mut().append_pair("v", id);
        let page_url = page_url.to_string();

        let page = self.fetcher.fetch(&page_url, &self.options).await?.text().await?;
        let data = parse_watch_page(&page_url, &page)?;
        debug!(
            media_types = ?data.media_types().collect::<Vec<_>>(),
            "video resolved"
        );
        Ok(VideoResource {
            id: id.to_string(),
            data,
        })
    }
}

/// Extracts and groups the adaptive formats embedded in a watch page.
///
/// # Errors
///
/// - [`ExtractError::Extraction`] if the player config markers or the
///   `adaptive_fmts` field are missing, or a descriptor has no type
/// - [`FetchError::Decode`] (wrapped) if the embedded config is not valid JSON
pub fn parse_watch_page(page_url: &str, page: &str) -> Result<VideoFormatGroup, ExtractError> {
    let blob = PLAYER_CONFIG_RE
        .captures(page)
        .and_then(|caps| caps.get(1))
        .ok_or_else(|| ExtractError::extraction(page_url, "player config not found in page"))?;

    let config: PlayerConfig =
        serde_json::from_str(blob.as_str()).map_err(|e| FetchError::decode(page_url, e))?;
    let adaptive = config.args.adaptive_fmts.ok_or_else(|| {
        ExtractError::extraction(page_url, "player config has no adaptive_fmts")
    })?;

    let formats = adaptive
        .split(',')
        .filter(|entry| !entry.trim().is_empty())
        .map(|entry| FormatDescriptor::parse(page_url, entry))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(VideoFormatGroup::from_formats(formats))
}

#[async_trait]
impl Extractor for YoutubeExtractor {
    fn name(&self) -> &'static str {
        EXTRACTOR_NAME
    }

    fn resource_kinds(&self) -> &'static [&'static str] {
        RESOURCE_KINDS
    }

    #[tracing::instrument(skip(self), fields(extractor = EXTRACTOR_NAME, url = %url))]
    async fn resolve(&self, url: &str) -> Result<Resource, ExtractError> {
        let parsed = parse_input_url(url)?;
        let (kind, _) = path_kind_and_id(&parsed);

        match kind {
            Some("watch") => {
                let id = parsed
                    .query_pairs()
                    .find(|(key, _)| key == "v")
                    .map(|(_, value)| value.trim().to_string())
                    .filter(|value| !value.is_empty())
                    .ok_or_else(|| ExtractError::extraction(url, "watch URL has no 'v' parameter"))?;
                Ok(Resource::Video(self.video(&id).await?))
            }
            // Channel listings are recognised upstream but have no resolution.
            other => Err(ExtractError::unknown_resource_kind(
                EXTRACTOR_NAME,
                url,
                other.unwrap_or_default(),
                RESOURCE_KINDS,
            )),
        }
    }
}
