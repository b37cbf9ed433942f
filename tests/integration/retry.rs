use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use signtusk_sdk::ErrorKind;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use crate::common::{client_for, client_with_timeout};

fn failing_then_ok(
    failures: u32,
    status: u16,
) -> (
    Arc<AtomicU32>,
    impl Fn(&Request) -> ResponseTemplate + Send + Sync + 'static,
) {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    let responder = move |_: &Request| {
        if counter.fetch_add(1, Ordering::SeqCst) < failures {
            ResponseTemplate::new(status)
        } else {
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true}))
        }
    };
    (calls, responder)
}

#[tokio::test]
async fn get_succeeds_after_retry_count_failures() {
    let mock_server = MockServer::start().await;
    let retry_count = 3;
    let (calls, responder) = failing_then_ok(retry_count, 503);

    Mock::given(method("GET"))
        .and(path("/v1/documents"))
        .respond_with(responder)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, retry_count);
    let body: serde_json::Value = client.get_json("/v1/documents").await.unwrap();

    assert_eq!(body["ok"], true);
    assert_eq!(calls.load(Ordering::SeqCst), retry_count + 1);
}

#[tokio::test]
async fn post_is_retried_but_patch_is_not() {
    let mock_server = MockServer::start().await;
    let (post_calls, post_responder) = failing_then_ok(1, 502);
    let (patch_calls, patch_responder) = failing_then_ok(1, 502);

    Mock::given(method("POST"))
        .and(path("/v1/envelopes"))
        .respond_with(post_responder)
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/v1/envelopes/env_1"))
        .respond_with(patch_responder)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, 2);
    let body = serde_json::json!({"subject": "Please sign"});

    assert_eq!(client.post("/v1/envelopes", &body).await.unwrap().status(), 200);
    assert_eq!(post_calls.load(Ordering::SeqCst), 2);

    let err = client.patch("/v1/envelopes/env_1", &body).await.unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Server(_)));
    assert_eq!(patch_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn exhausted_rate_limit_surfaces_as_rate_limited() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/documents"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("retry-after", "0")
                .insert_header("x-request-id", "req_429")
                .set_body_json(serde_json::json!({"message": "Too many requests"})),
        )
        .expect(3)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, 2);
    let err = client.get("/v1/documents").await.unwrap_err();

    assert!(err.is_rate_limited());
    assert!(err.is_retryable());
    assert_eq!(err.request_id(), Some("req_429"));
    assert_eq!(err.retry_after(), Some(Duration::ZERO));
}

#[tokio::test]
async fn unresponsive_server_raises_timeout_once() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = client_with_timeout(&mock_server, 1, Duration::from_millis(150));
    let started = Instant::now();
    let err = client.get("/v1/slow").await.unwrap_err();

    assert!(matches!(err.kind, ErrorKind::Timeout(_)), "got {:?}", err.kind);
    assert!(!err.is_network());
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn close_fails_in_flight_requests_with_network_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/hang"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(10)))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, 0);
    let pending = {
        let client = client.clone();
        tokio::spawn(async move { client.get("/v1/hang").await })
    };

    tokio::time::sleep(Duration::from_millis(100)).await;
    client.close();
    client.close();

    let err = tokio::time::timeout(Duration::from_secs(2), pending)
        .await
        .expect("in-flight request must not hang after close")
        .unwrap()
        .unwrap_err();

    assert!(matches!(err.kind, ErrorKind::Network(_)));
    assert!(client.get("/v1/hang").await.unwrap_err().is_network());
}
