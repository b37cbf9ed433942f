use signtusk_sdk::auth::OAuthClient;
use signtusk_sdk::client::OAuthSettings;
use signtusk_sdk::{Credential, SdkConfig, SignTuskClient};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use crate::common::client_for;

/// Echoes the Authorization header back as the body, or `none`.
async fn mount_whoami(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/whoami"))
        .respond_with(|req: &Request| {
            let auth = req
                .headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("none")
                .to_string();
            ResponseTemplate::new(200).set_body_string(auth)
        })
        .mount(server)
        .await;
}

#[tokio::test]
async fn set_and_clear_auth_token() {
    let mock_server = MockServer::start().await;
    mount_whoami(&mock_server).await;

    let client = client_for(&mock_server, 0);
    assert_eq!(
        client.get("/v1/whoami").await.unwrap().text(),
        "Bearer sk_test_integration"
    );

    client.clear_auth();
    assert_eq!(client.get("/v1/whoami").await.unwrap().text(), "none");
    assert!(client.credential().is_none());

    client.set_auth_token("X").unwrap();
    assert_eq!(client.get("/v1/whoami").await.unwrap().text(), "Bearer X");
    assert_eq!(client.credential(), Some(Credential::ApiKey("X".into())));
}

#[tokio::test]
async fn auth_change_is_visible_to_clones() {
    let mock_server = MockServer::start().await;
    mount_whoami(&mock_server).await;

    let client = client_for(&mock_server, 0);
    let clone = client.clone();

    client.set_auth_token("rotated").unwrap();
    assert_eq!(clone.get("/v1/whoami").await.unwrap().text(), "Bearer rotated");
}

#[tokio::test]
async fn concurrent_token_rotation_never_tears_headers() {
    let mock_server = MockServer::start().await;
    mount_whoami(&mock_server).await;

    let client = client_for(&mock_server, 0);
    let rotations = {
        let client = client.clone();
        tokio::spawn(async move {
            for i in 0..50 {
                client.set_auth_token(format!("token_{i}")).unwrap();
                tokio::task::yield_now().await;
            }
        })
    };

    let calls = (0..30).map(|_| {
        let client = client.clone();
        async move { client.get("/v1/whoami").await.unwrap().text() }
    });
    let seen = futures::future::join_all(calls).await;
    rotations.await.unwrap();

    for value in seen {
        assert!(
            value == "Bearer sk_test_integration" || value.starts_with("Bearer token_"),
            "unexpected header value {value:?}"
        );
    }
}

#[tokio::test]
async fn oauth_client_credentials_feed_the_pipeline() {
    let mock_server = MockServer::start().await;
    mount_whoami(&mock_server).await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "oauth_at",
            "token_type": "Bearer",
            "expires_in": 900
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = SdkConfig::builder()
        .oauth(OAuthSettings::new("app").with_secret("secret"))
        .base_url(mock_server.uri())
        .build()
        .unwrap();
    let client = SignTuskClient::new(config.clone()).unwrap();
    assert_eq!(client.get("/v1/whoami").await.unwrap().text(), "none");

    let token = OAuthClient::from_config(&config)
        .unwrap()
        .authorize(&client)
        .await
        .unwrap();

    assert!(!token.is_expired());
    assert_eq!(client.get("/v1/whoami").await.unwrap().text(), "Bearer oauth_at");
}
