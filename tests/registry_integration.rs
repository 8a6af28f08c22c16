//! Integration tests for extractor lookup through the public registry.

use extractdl_core::{ConfigError, ExtractError, ExtractorConfig, build_default_registry};
use tempfile::TempDir;

#[test]
fn test_default_registry_lists_every_extractor() {
    let registry = build_default_registry(&ExtractorConfig::default()).unwrap();
    assert_eq!(registry.names(), vec!["mangadex", "youtube"]);
    assert_eq!(
        registry.get("youtube").unwrap().resource_kinds(),
        &["watch"]
    );
}

#[tokio::test]
async fn test_unknown_extractor_name_writes_nothing() {
    let registry = build_default_registry(&ExtractorConfig::default()).unwrap();
    let out = TempDir::new().unwrap();

    let result = registry
        .download("dailymotion", "https://www.dailymotion.com/video/x1", out.path())
        .await;

    let err = result.unwrap_err();
    assert!(matches!(err, ExtractError::UnknownExtractor { ref name, .. } if name == "dailymotion"));
    assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_non_http_url_is_rejected_before_network() {
    let registry = build_default_registry(&ExtractorConfig::default()).unwrap();
    let result = registry.resolve("mangadex", "not a url").await;
    assert!(matches!(result, Err(ExtractError::InvalidUrl { .. })));
}

#[test]
fn test_invalid_config_is_reported() {
    let config = ExtractorConfig {
        target_lang: "  ".to_string(),
        ..ExtractorConfig::default()
    };
    let err = build_default_registry(&config).unwrap_err();
    assert!(matches!(err, ExtractError::Config(ConfigError::EmptyTargetLang)));
}
