//! Translation cache integration tests
//!
//! The cache runs over the real HTTP adapter against a mock service, so
//! the mocks' expectation counts prove which calls reached the network.

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use intervox::application::TranslationCache;
use intervox::infrastructure::HttpApiClient;

/// Responds to /translate by tagging the text with the target language,
/// mirroring what the service does closely enough for assertions.
struct EchoTranslate;

impl wiremock::Respond for EchoTranslate {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
        let text = body["text"].as_str().unwrap_or_default();
        let target = body["target_language"].as_str().unwrap_or_default();
        ResponseTemplate::new(200)
            .set_body_json(json!({"translated_text": format!("[{}] {}", target, text)}))
    }
}

#[tokio::test]
async fn second_identical_call_is_served_from_cache() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/translate"))
        .respond_with(EchoTranslate)
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpApiClient::new(server.uri()).unwrap();
    let cache = TranslationCache::new();

    let first = cache.localize(&client, "Kur statysite pirtį?", "en").await;
    let second = cache.localize(&client, "Kur statysite pirtį?", "en").await;

    assert_eq!(first, "[en] Kur statysite pirtį?");
    assert_eq!(first, second);
    assert_eq!(cache.len(), 1);
}

#[tokio::test]
async fn source_language_never_touches_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/translate"))
        .respond_with(EchoTranslate)
        .expect(0)
        .mount(&server)
        .await;

    let client = HttpApiClient::new(server.uri()).unwrap();
    let cache = TranslationCache::new();

    let out = cache.localize(&client, "Kur statysite pirtį?", "lt").await;

    assert_eq!(out, "Kur statysite pirtį?");
    assert!(cache.is_empty());
}

#[tokio::test]
async fn failure_degrades_to_source_text_without_poisoning_the_cache() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/translate"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpApiClient::new(server.uri()).unwrap();
    let cache = TranslationCache::new();

    let out = cache.localize(&client, "Kur statysite pirtį?", "en").await;
    assert_eq!(out, "Kur statysite pirtį?");
    assert!(cache.is_empty());

    // Once the service recovers, the same key is fetched again
    server.reset().await;
    Mock::given(method("POST"))
        .and(path("/translate"))
        .respond_with(EchoTranslate)
        .expect(1)
        .mount(&server)
        .await;

    let out = cache.localize(&client, "Kur statysite pirtį?", "en").await;
    assert_eq!(out, "[en] Kur statysite pirtį?");
    assert_eq!(cache.len(), 1);
}

#[tokio::test]
async fn batch_localization_preserves_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/translate"))
        .respond_with(EchoTranslate)
        .expect(3)
        .mount(&server)
        .await;

    let client = HttpApiClient::new(server.uri()).unwrap();
    let cache = TranslationCache::new();

    let texts = vec![
        "Kur statysite?".to_string(),
        "Kiek žmonių naudosis?".to_string(),
        "Koks biudžetas?".to_string(),
    ];
    let out = cache.localize_all(&client, &texts, "en").await;

    assert_eq!(
        out,
        vec![
            "[en] Kur statysite?".to_string(),
            "[en] Kiek žmonių naudosis?".to_string(),
            "[en] Koks biudžetas?".to_string(),
        ]
    );
    assert_eq!(cache.len(), 3);
}

#[tokio::test]
async fn distinct_target_languages_fetch_separately() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/translate"))
        .respond_with(EchoTranslate)
        .expect(2)
        .mount(&server)
        .await;

    let client = HttpApiClient::new(server.uri()).unwrap();
    let cache = TranslationCache::new();

    let en = cache.localize(&client, "Kur statysite?", "en").await;
    let de = cache.localize(&client, "Kur statysite?", "de").await;

    assert_eq!(en, "[en] Kur statysite?");
    assert_eq!(de, "[de] Kur statysite?");
    assert_eq!(cache.len(), 2);
}
