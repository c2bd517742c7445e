//! Integration tests for animevsub-provider.
//!
//! These tests run the provider against a mock catalog served by wiremock.

use animevsub_provider::config::Config;
use animevsub_provider::error::AppError;
use animevsub_provider::provider::{Provider, SearchOptions};
use animevsub_provider::types::{EpisodeRecord, VideoSourceType};
use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider_for(server: &MockServer) -> Provider {
    let config = Config {
        api_base_url: server.uri(),
        timeout_secs: 5,
        ..Config::new()
    };
    Provider::new(config).unwrap()
}

fn episodes_page(entries: &[(&str, &str, Option<&str>)], has_next_page: bool) -> Value {
    let episodes: Vec<Value> = entries
        .iter()
        .map(|(label, id, server)| match server {
            Some(server) => json!({"episodeNumber": label, "episodeId": id, "server": server}),
            None => json!({"episodeNumber": label, "episodeId": id}),
        })
        .collect();
    json!({
        "provider": "ANIMEVIETSUB",
        "limit": 100,
        "offset": 0,
        "total": episodes.len(),
        "hasNextPage": has_next_page,
        "episodes": episodes,
    })
}

async fn mount_page(server: &MockServer, offset: u32, body: Value) {
    Mock::given(method("GET"))
        .and(path("/stream/episodes"))
        .and(query_param("offset", offset.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

fn keys(episodes: &[EpisodeRecord]) -> Vec<&str> {
    episodes.iter().map(|e| e.canonical_key.as_str()).collect()
}

/// Test that paging sends the expected query and dedups across pages.
#[tokio::test]
async fn test_find_episodes_pages_and_dedups() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/stream/episodes"))
        .and(query_param("id", "21"))
        .and(query_param("provider", "ANIMEVIETSUB"))
        .and(query_param("limit", "100"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(episodes_page(
            &[("2", "ep-2", Some("AnimeVsub")), ("1", "ep-1-first", Some("AnimeVsub"))],
            true,
        )))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(
        &server,
        100,
        episodes_page(&[("1", "ep-1-mirror", Some("Mirror")), ("3", "ep-3", None)], false),
    )
    .await;

    let episodes = provider_for(&server).find_episodes("21").await.unwrap();

    assert_eq!(keys(&episodes), vec!["1", "2", "3"]);
    assert_eq!(episodes[0].identifier, "ep-1-first");
    assert_eq!(episodes[0].server.as_deref(), Some("AnimeVsub"));
    assert_eq!(episodes[0].display_title, "Episode 1");
    assert!(episodes.iter().all(|e| e.media_id == 21));
}

/// Test the release ordering of variant labels end to end.
#[tokio::test]
async fn test_find_episodes_orders_variants() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        0,
        episodes_page(
            &[
                ("2", "b", None),
                ("1_2", "part", None),
                ("1", "a", None),
                ("1-2", "range", None),
                ("1_END", "end", None),
            ],
            false,
        ),
    )
    .await;

    let episodes = provider_for(&server).find_episodes("5").await.unwrap();

    assert_eq!(keys(&episodes), vec!["1", "1_2", "1-2", "1_END", "2"]);
    assert_eq!(episodes[2].display_title, "Episode 1-2");
    assert!(
        episodes
            .windows(2)
            .all(|w| w[0].ordering_number <= w[1].ordering_number)
    );
}

/// Test that a mapping miss stops paging and reports not found.
#[tokio::test]
async fn test_find_episodes_mapping_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/stream/episodes"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"code": "MAPPING_NOT_FOUND"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/stream/episodes"))
        .and(query_param("offset", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(episodes_page(&[], false)))
        .expect(0)
        .mount(&server)
        .await;

    let err = provider_for(&server).find_episodes("21").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

/// Test that a 404 without a known code keeps its status.
#[tokio::test]
async fn test_find_episodes_unknown_404_is_upstream() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/stream/episodes"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not here"))
        .mount(&server)
        .await;

    let err = provider_for(&server).find_episodes("21").await.unwrap_err();
    assert!(matches!(err, AppError::Upstream { status: Some(404), .. }));
}

/// Test that a server error on a later page is propagated.
#[tokio::test]
async fn test_find_episodes_server_error_on_second_page() {
    let server = MockServer::start().await;
    mount_page(&server, 0, episodes_page(&[("1", "a", None)], true)).await;
    Mock::given(method("GET"))
        .and(path("/stream/episodes"))
        .and(query_param("offset", "100"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let err = provider_for(&server).find_episodes("21").await.unwrap_err();
    assert!(matches!(err, AppError::Upstream { status: Some(500), .. }));
    assert!(err.to_string().contains("500"));
}

/// Test that an empty listing is not found rather than an empty list.
#[tokio::test]
async fn test_find_episodes_empty_listing() {
    let server = MockServer::start().await;
    mount_page(&server, 0, episodes_page(&[], true)).await;

    let err = provider_for(&server).find_episodes("21").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

/// Test that a non-numeric media id is rejected before any request.
#[tokio::test]
async fn test_find_episodes_invalid_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = provider_for(&server).find_episodes("one-piece").await.unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));
}

/// Test that an id with trailing text is sent as its leading integer.
#[tokio::test]
async fn test_find_episodes_uses_leading_integer_of_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stream/episodes"))
        .and(query_param("id", "21"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(episodes_page(&[("1", "ep-1", None)], false)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let episodes = provider_for(&server).find_episodes("21abc").await.unwrap();
    assert_eq!(keys(&episodes), vec!["1"]);
}

/// Test that repeated runs give the same list.
#[tokio::test]
async fn test_find_episodes_is_idempotent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stream/episodes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(episodes_page(
            &[("3_END", "c", None), ("3", "a", Some("B")), ("3", "dup", Some("A"))],
            false,
        )))
        .expect(2)
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let first = provider.find_episodes("9").await.unwrap();
    let second = provider.find_episodes("9").await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
    assert_eq!(first[0].identifier, "a");
}

/// Test search title fallback and query parameters.
#[tokio::test]
async fn test_search_results() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("title", "one piece"))
        .and(query_param("limit", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "results": [
                {"id": 21, "mediaType": "TV", "titles": {"en": "One Piece", "vi": "Đảo Hải Tặc"}},
                {"id": 22, "titles": {"ja": "ワンピース"}},
                {"id": 23, "titles": {}}
            ],
            "total": 3,
            "limit": 20,
            "offset": 0,
            "hasNextPage": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let results = provider_for(&server)
        .search(&SearchOptions::query("one piece"))
        .await;

    let titles: Vec<&str> = results.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["One Piece", "ワンピース", "one piece"]);
    assert_eq!(results[0].id, "21");
    assert!(results.iter().all(|r| r.url.is_empty()));
}

/// Test that search failures degrade to an empty list.
#[tokio::test]
async fn test_search_failures_are_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("title", "broken"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("title", "unsuccessful"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "results": [{"id": 1, "titles": {"en": "Ignored"}}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("title", "garbled"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    for query in ["broken", "unsuccessful", "garbled"] {
        assert!(provider.search(&SearchOptions::query(query)).await.is_empty());
    }
}

/// Test resolving a stream on the episode's own server.
#[tokio::test]
async fn test_find_episode_server_uses_episode_server() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        0,
        episodes_page(&[("1", "ep-token/1", Some("Mirror"))], false),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/stream/source"))
        .and(query_param("episodeData", "ep-token/1"))
        .and(query_param("server", "Mirror"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "server": "Mirror",
            "type": "HLS",
            "corsProxyRequired": true,
            "proxyHeaders": {"Referer": "https://animevietsub.tv/"},
            "url": "/proxy/m3u8/abc"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let episodes = provider.find_episodes("21").await.unwrap();
    let resolved = provider
        .find_episode_server(&episodes[0], "default")
        .await
        .unwrap();

    assert_eq!(resolved.server, "Mirror");
    assert_eq!(resolved.headers["Referer"], "https://animevietsub.tv/");
    assert_eq!(resolved.video_sources.len(), 1);
    assert_eq!(
        resolved.video_sources[0].url,
        format!("{}/proxy/m3u8/abc", server.uri())
    );
    assert_eq!(resolved.video_sources[0].kind, VideoSourceType::M3u8);
}

/// Test that a source lookup failure is an upstream error.
#[tokio::test]
async fn test_find_episode_server_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stream/source"))
        .and(query_param("server", "AnimeVsub"))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&server)
        .await;

    let episode = EpisodeRecord {
        identifier: "ep".to_string(),
        display_title: "Episode 1".to_string(),
        ordering_number: 1,
        canonical_key: "1".to_string(),
        server: None,
        media_id: 21,
    };
    let err = provider_for(&server)
        .find_episode_server(&episode, "")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Upstream { status: Some(502), .. }));
}
