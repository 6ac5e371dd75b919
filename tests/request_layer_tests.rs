//! Request layer integration tests
//!
//! Exercise the HTTP adapter's retry, one-shot, and admin-key behavior
//! against a mock service. Expectation counts on the mocks prove how
//! many requests actually left the client.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use intervox::application::ports::{ApiError, InterviewApi, Translator};
use intervox::domain::recording::AudioClip;
use intervox::domain::session::{InterviewMode, SessionId};
use intervox::infrastructure::{HttpApiClient, RetryPolicy};

const SESSION: &str = "123e4567-e89b-42d3-a456-426614174000";

fn sid() -> SessionId {
    SessionId::parse(SESSION).unwrap()
}

/// A client whose backoff is milliseconds instead of seconds
fn fast_client(server: &MockServer) -> HttpApiClient {
    HttpApiClient::new(server.uri())
        .unwrap()
        .with_retry_policy(RetryPolicy::new(3, Duration::from_millis(5)))
}

fn snapshot_body() -> serde_json::Value {
    json!({
        "session_id": SESSION,
        "round": 1,
        "state": {
            "language": "lt",
            "interview_mode": "quick",
            "next_questions": [{"id": "Q1", "text": "Kur statysite?"}]
        }
    })
}

#[tokio::test]
async fn not_found_is_never_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/session/{}/state", SESSION)))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"detail": "Session not found"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = fast_client(&server);
    let err = client.session_state(&sid()).await.unwrap_err();

    assert_eq!(err.status(), Some(404));
    assert!(err.is_client_error());
    assert!(err.to_string().contains("Session not found"));
}

#[tokio::test]
async fn server_error_is_retried_three_times_then_raised() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/session/{}/state", SESSION)))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let client = fast_client(&server);
    let err = client.session_state(&sid()).await.unwrap_err();

    assert_eq!(err.status(), Some(503));
    assert!(!err.is_client_error());
}

#[tokio::test]
async fn transient_failure_recovers_on_a_later_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/session/{}/state", SESSION)))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/session/{}/state", SESSION)))
        .respond_with(ResponseTemplate::new(200).set_body_json(snapshot_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = fast_client(&server);
    let snapshot = client.session_state(&sid()).await.unwrap();

    assert_eq!(snapshot.round, 1);
    assert_eq!(snapshot.state.next_questions.len(), 1);
}

#[tokio::test]
async fn malformed_body_counts_as_transient() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/session/{}/state", SESSION)))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/session/{}/state", SESSION)))
        .respond_with(ResponseTemplate::new(200).set_body_json(snapshot_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = fast_client(&server);
    assert!(client.session_state(&sid()).await.is_ok());
}

#[tokio::test]
async fn start_session_posts_language_and_mode() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/session/start"))
        .and(body_json(json!({"language": "en", "interview_mode": "precise"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "session_id": SESSION,
            "round": 1,
            "questions": [{"id": "Q1", "text": "Kur statysite?"}],
            "interview_mode": "precise"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = fast_client(&server);
    let started = client
        .start_session("en", InterviewMode::Precise)
        .await
        .unwrap();

    assert_eq!(started.session_id, sid());
    assert_eq!(started.interview_mode, InterviewMode::Precise);
    assert_eq!(started.questions.len(), 1);
}

#[tokio::test]
async fn transcribe_gets_exactly_one_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/session/{}/transcribe", SESSION)))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let client = fast_client(&server);
    let clip = AudioClip::new(vec![0u8; 32], 1500);
    let err = client.transcribe(&sid(), &clip, "lt").await.unwrap_err();

    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn translate_gets_exactly_one_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/translate"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let client = fast_client(&server);
    assert!(client.translate("Kur statysite?", "en").await.is_err());
}

#[tokio::test]
async fn admin_key_travels_sanitized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/brain/config/verify"))
        .and(header("X-Admin-Key", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = fast_client(&server).with_admin_key(Some(" sec\u{0000}ret\n ".to_string()));
    client.verify_admin_key().await.unwrap();
}

#[tokio::test]
async fn missing_admin_key_fails_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/brain/config/verify"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = fast_client(&server);
    let err = client.verify_admin_key().await.unwrap_err();

    assert!(matches!(err, ApiError::MissingAdminKey));
}

#[tokio::test]
async fn download_returns_raw_bytes() {
    let server = MockServer::start().await;
    let report = b"# Pirties projektas\n".to_vec();
    Mock::given(method("GET"))
        .and(path(format!("/session/{}/download", SESSION)))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(report.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let client = fast_client(&server);
    let bytes = client.download_report(&sid()).await.unwrap();

    assert_eq!(bytes, report);
}

#[tokio::test]
async fn validation_detail_is_preserved_in_the_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/session/start"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "detail": [{"loc": ["body", "language"], "msg": "field required"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = fast_client(&server);
    let err = client
        .start_session("en", InterviewMode::Quick)
        .await
        .unwrap_err();

    match err {
        ApiError::Status {
            status, details, ..
        } => {
            assert_eq!(status, 422);
            assert!(details.is_some());
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
