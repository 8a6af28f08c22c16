//! Shared helpers for extractor modules: URL splitting and static regexes.

use regex::Regex;
use url::Url;

use super::ExtractError;

/// Compiles a regex at static init; panics on invalid pattern.
pub fn compile_static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid static regex '{pattern}': {e}"))
}

/// Parses an extractor input URL.
///
/// # Errors
///
/// Returns [`ExtractError::InvalidUrl`] if `input` is not an absolute URL.
pub fn parse_input_url(input: &str) -> Result<Url, ExtractError> {
    Url::parse(input.trim()).map_err(|_| ExtractError::invalid_url(input))
}

/// Splits a URL path into its first two segments: the resource kind and id.
///
/// `https://site/chapter/123/1` gives `(Some("chapter"), Some("123"))`;
/// empty segments count as missing.
#[must_use]
pub fn path_kind_and_id(url: &Url) -> (Option<&str>, Option<&str>) {
    let mut segments = url
        .path_segments()
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|segment| !segment.is_empty());
    (segments.next(), segments.next())
}

/// Joins a base URL and path segments with single slashes.
#[must_use]
pub fn join_url(base: &str, parts: &[&str]) -> String {
    let mut joined = base.trim_end_matches('/').to_string();
    for part in parts {
        joined.push('/');
        joined.push_str(part.trim_matches('/'));
    }
    joined
}
