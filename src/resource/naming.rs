//! Directory and file naming for downloaded resources.
//!
//! Names are built from upstream metadata, so they go through one sanitizer:
//! every character outside `[A-Za-z0-9-_.]` becomes `_` and trailing
//! underscores are dropped. Chapter directory names are additionally bounded
//! to a single path component's byte limit.

use std::path::{Component, Path};

/// Maximum length in bytes of a single path component on common filesystems.
pub const MAX_COMPONENT_BYTES: usize = 255;

/// Appended to a chapter directory name that had to be truncated.
pub const FILL_MARKER: &str = "...";

/// Used when sanitizing leaves nothing usable (empty or dot-only names).
const FALLBACK_NAME: &str = "untitled";

/// Replaces disallowed characters with `_` and trims trailing underscores.
///
/// Empty results and names that would resolve to `.` or `..` fall back to
/// `untitled` so the component always stays inside its parent directory.
#[must_use]
pub fn sanitize_component(raw: &str) -> String {
    let sanitized: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = sanitized.trim_end_matches('_');

    if trimmed.is_empty() || !is_safe_segment(trimmed) {
        FALLBACK_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Cuts `name` to [`MAX_COMPONENT_BYTES`], ending it with [`FILL_MARKER`] when cut.
#[must_use]
pub fn truncate_component(name: &str) -> String {
    if name.len() <= MAX_COMPONENT_BYTES {
        return name.to_string();
    }

    let mut cut = MAX_COMPONENT_BYTES - FILL_MARKER.len();
    while !name.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}{FILL_MARKER}", &name[..cut])
}

/// Directory name for a chapter: `vol-<volume>_ch-<chapter>_-_<title>`.
///
/// The title is lowercased; the whole name is sanitized and bounded.
#[must_use]
pub fn chapter_dir_name(volume: &str, chapter: &str, title: Option<&str>) -> String {
    let title = title.map(str::to_lowercase).unwrap_or_default();
    let raw = format!("vol-{volume}_ch-{chapter}_-_{title}");
    truncate_component(&sanitize_component(&raw))
}

/// Directory name for a manga: the sanitized, lowercased title (not truncated).
#[must_use]
pub fn manga_dir_name(title: &str) -> String {
    sanitize_component(&title.to_lowercase())
}

/// File name for the page at `index`: the index followed by the source extension.
///
/// `("001.jpg", 0)` gives `0.jpg`; a source without an extension gives `0`.
#[must_use]
pub fn page_file_name(index: usize, source_name: &str) -> String {
    format!("{index}{}", extension_of(source_name))
}

/// Extension of the last path segment including the dot, or `""`.
///
/// A leading dot does not start an extension (`.hidden` has none).
fn extension_of(source_name: &str) -> &str {
    let base = source_name.rsplit('/').next().unwrap_or(source_name);
    match base.rfind('.') {
        Some(pos) if pos > 0 => &base[pos..],
        _ => "",
    }
}

fn is_safe_segment(name: &str) -> bool {
    !Path::new(name).components().any(|component| {
        matches!(
            component,
            Component::CurDir | Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    })
}
