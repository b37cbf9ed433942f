use signtusk_sdk::{Environment, ErrorKind, RawConfig, SdkConfig, SignTuskClient};
use wiremock::MockServer;

#[tokio::test]
async fn missing_credential_fails_before_any_network_call() {
    let mock_server = MockServer::start().await;

    let raw: RawConfig = serde_json::from_value(serde_json::json!({
        "baseUrl": mock_server.uri(),
        "timeoutMs": 1000
    }))
    .unwrap();

    let err = SignTuskClient::from_raw(raw).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Config(_)));
    assert!(!err.is_retryable());

    let received = mock_server.received_requests().await.unwrap_or_default();
    assert!(received.is_empty());
}

#[test]
fn environment_resolves_base_url() {
    let raw: RawConfig = serde_json::from_value(serde_json::json!({
        "apiKey": "sk_test",
        "environment": "staging"
    }))
    .unwrap();

    let config = SdkConfig::from_raw(raw).unwrap();
    assert_eq!(config.environment(), Environment::Staging);
    assert_eq!(
        config.base_url(),
        "https://api-staging.docusign-alternative.com"
    );
}

#[test]
fn unknown_environment_defaults_to_production() {
    let raw: RawConfig = serde_json::from_value(serde_json::json!({
        "apiKey": "sk_test",
        "environment": "qa-cluster-7",
        "baseUrl": ""
    }))
    .unwrap();

    let config = SdkConfig::from_raw(raw).unwrap();
    assert_eq!(config.base_url(), Environment::Production.base_url());
}

#[test]
fn explicit_base_url_wins_over_environment() {
    let config = SdkConfig::builder()
        .jwt(signtusk_sdk::client::JwtCredential::new("eyJ.test.sig"))
        .environment(Environment::Development)
        .base_url("https://sign.internal.example.com/")
        .build()
        .unwrap();

    assert_eq!(config.base_url(), "https://sign.internal.example.com");
    assert_eq!(config.environment(), Environment::Development);
}
