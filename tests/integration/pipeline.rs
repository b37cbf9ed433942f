use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use signtusk_sdk::{ErrorKind, FilePart, LogicalRequest};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use crate::common::client_for;

#[tokio::test]
async fn success_response_is_returned_untouched() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/v1/templates/tpl_1"))
        .and(body_json(serde_json::json!({"name": "Offer letter"})))
        .respond_with(
            ResponseTemplate::new(202)
                .insert_header("x-request-id", "req_ok")
                .insert_header("x-custom", "kept")
                .set_body_string("accepted"),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, 0);
    let response = client
        .put("/v1/templates/tpl_1", &serde_json::json!({"name": "Offer letter"}))
        .await
        .unwrap();

    assert_eq!(response.status(), 202);
    assert_eq!(response.text(), "accepted");
    assert_eq!(response.header("x-custom"), Some("kept"));
    assert_eq!(response.request_id(), Some("req_ok"));
}

#[tokio::test]
async fn not_found_example_scenario() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/documents"))
        .respond_with(
            ResponseTemplate::new(404)
                .insert_header("x-request-id", "abc123")
                .set_body_json(serde_json::json!({"message": "not found"})),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, 3);
    let err = client.get("v1/documents").await.unwrap_err();

    assert!(matches!(err.kind, ErrorKind::NotFound(_)));
    assert_eq!(err.message(), "not found");
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.request_id(), Some("abc123"));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn every_error_status_maps_to_one_kind() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .respond_with(|req: &Request| {
            let status: u16 = req
                .url
                .path()
                .trim_start_matches("/status/")
                .parse()
                .unwrap_or(500);
            ResponseTemplate::new(status)
        })
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, 0);
    let cases: [(u16, fn(&ErrorKind) -> bool); 9] = [
        (400, |k| matches!(k, ErrorKind::Validation(_))),
        (401, |k| matches!(k, ErrorKind::Authentication(_))),
        (403, |k| matches!(k, ErrorKind::Authorization(_))),
        (404, |k| matches!(k, ErrorKind::NotFound(_))),
        (409, |k| matches!(k, ErrorKind::Conflict(_))),
        (422, |k| matches!(k, ErrorKind::Validation(_))),
        (429, |k| matches!(k, ErrorKind::RateLimited(_))),
        (503, |k| matches!(k, ErrorKind::Server(_))),
        (451, |k| matches!(k, ErrorKind::Api(_))),
    ];

    for (status, expected) in cases {
        let err = client.delete(&format!("/status/{status}")).await.unwrap_err();
        assert!(expected(&err.kind), "status {status} mapped to {:?}", err.kind);
        assert_eq!(err.status(), Some(status));
        assert_eq!(err.request_id(), None);
        assert_eq!(err.is_retryable(), status == 429 || status >= 500);
    }
}

#[tokio::test]
async fn unparseable_error_body_uses_raw_text_or_fallback() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/html"))
        .respond_with(ResponseTemplate::new(409).set_body_string("<h1>Conflict</h1>"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/empty"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, 0);

    let err = client.get("/html").await.unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Conflict(_)));
    assert_eq!(err.message(), "<h1>Conflict</h1>");

    let err = client.get("/empty").await.unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Authorization(_)));
    assert_eq!(err.message(), "Unknown error");
}

#[tokio::test]
async fn upload_never_sends_json_content_type() {
    let mock_server = MockServer::start().await;
    let json_uploads = Arc::new(AtomicU32::new(0));
    let json_uploads_clone = json_uploads.clone();

    Mock::given(method("POST"))
        .and(path("/v1/documents/upload"))
        .respond_with(move |req: &Request| {
            let content_type = req
                .headers
                .get("content-type")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            if content_type.contains("application/json") {
                json_uploads_clone.fetch_add(1, Ordering::SeqCst);
                ResponseTemplate::new(415)
            } else if content_type.starts_with("multipart/form-data") {
                ResponseTemplate::new(201)
            } else {
                ResponseTemplate::new(400)
            }
        })
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, 0);
    let file = FilePart::new(b"%PDF-1.4 test".to_vec()).with_file_name("contract.pdf");

    let response = client
        .upload_file(
            "/v1/documents/upload",
            file,
            [("title", "Contract"), ("folder", "legal")],
        )
        .await
        .unwrap();
    assert_eq!(response.status(), 201);

    // A caller-supplied JSON content type is still dropped for multipart bodies.
    let request = LogicalRequest::post("/v1/documents/upload")
        .header("Content-Type", "application/json")
        .file("file", FilePart::new(b"data".to_vec()));
    assert_eq!(client.execute(request).await.unwrap().status(), 201);

    assert_eq!(json_uploads.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn per_call_headers_override_defaults() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/documents/doc_1/download"))
        .and(header("accept", "application/pdf"))
        .and(header("authorization", "Bearer sk_test_integration"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF".to_vec()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, 0);
    let response = client
        .execute(
            LogicalRequest::get("/v1/documents/doc_1/download").header("Accept", "application/pdf"),
        )
        .await
        .unwrap();

    assert_eq!(&response.bytes()[..], b"%PDF");
}

#[tokio::test]
async fn concurrent_calls_complete_independently() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(|req: &Request| {
            if req.url.path().ends_with("/fail") {
                ResponseTemplate::new(400).set_body_json(serde_json::json!({"message": "bad"}))
            } else {
                ResponseTemplate::new(200).set_body_string(req.url.path().to_string())
            }
        })
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, 0);
    let calls = (0..16).map(|i| {
        let client = client.clone();
        async move {
            let path = if i % 4 == 0 {
                format!("/v1/{i}/fail")
            } else {
                format!("/v1/{i}")
            };
            (i, client.get(&path).await)
        }
    });

    for (i, result) in futures::future::join_all(calls).await {
        if i % 4 == 0 {
            assert!(matches!(result.unwrap_err().kind, ErrorKind::Validation(_)));
        } else {
            assert_eq!(result.unwrap().text(), format!("/v1/{i}"));
        }
    }
}
