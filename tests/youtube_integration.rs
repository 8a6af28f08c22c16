//! Integration tests for the video extractor against a mock watch page.

use std::time::Duration;

use extractdl_core::{ExtractError, ExtractorConfig, ExtractorRegistry, Resource, build_default_registry};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod support;
use support::socket_guard::start_mock_server_or_skip;

fn registry_for(server: &MockServer) -> ExtractorRegistry {
    let config = ExtractorConfig {
        request_delay: Duration::ZERO,
        youtube_base: server.uri(),
        ..ExtractorConfig::default()
    };
    build_default_registry(&config).unwrap()
}

fn watch_page() -> String {
    let adaptive_fmts = [
        "type=video%2Fmp4%3B+codecs%3D%22avc1%22&itag=137&clen=5000",
        "type=audio%2Fmp4%3B+codecs%3D%22mp4a%22&itag=140&clen=300",
        "type=video%2Fwebm%3B+codecs%3D%22vp9%22&itag=248&clen=9000",
    ]
    .join(",");
    let config = serde_json::json!({ "args": { "adaptive_fmts": adaptive_fmts } });
    format!(
        "<html><script>ytplayer.config = {config};ytplayer.load = function() {{}};</script></html>"
    )
}

#[tokio::test]
async fn test_watch_url_resolves_grouped_formats() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/watch"))
        .and(query_param("v", "dQw4w9WgXcQ"))
        .respond_with(ResponseTemplate::new(200).set_body_string(watch_page()))
        .expect(1)
        .mount(&server)
        .await;

    let registry = registry_for(&server);
    let resource = registry
        .resolve("youtube", "https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=10")
        .await
        .unwrap();

    let Resource::Video(video) = &resource else {
        panic!("expected a video, got {}", resource.kind());
    };
    assert_eq!(video.id(), "dQw4w9WgXcQ");
    let best_video = video.data().best("video").unwrap();
    assert_eq!(best_video.get("itag"), Some("248"));
    assert_eq!(best_video.content_length, 9000);
    assert_eq!(video.data().get("audio").unwrap().len(), 1);

    let out = TempDir::new().unwrap();
    let result = resource.download(out.path()).await;
    assert!(matches!(result, Err(ExtractError::NotImplemented { .. })));
    assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_watch_page_without_player_config_is_extraction_error() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/watch"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>no player</html>"))
        .mount(&server)
        .await;

    let registry = registry_for(&server);
    let result = registry
        .resolve("youtube", "https://www.youtube.com/watch?v=abc")
        .await;
    assert!(matches!(result, Err(ExtractError::Extraction { .. })));
}

#[tokio::test]
async fn test_channel_url_is_unknown_resource_kind() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let registry = registry_for(&server);
    let result = registry
        .resolve("youtube", "https://www.youtube.com/channel/UC123")
        .await;
    assert!(matches!(result, Err(ExtractError::UnknownResourceKind { .. })));
}
