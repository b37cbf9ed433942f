use std::sync::Once;
use std::time::Duration;

use signtusk_sdk::{SdkConfig, SignTuskClient};
use wiremock::MockServer;

static TRACING: Once = Once::new();

/// Install a test subscriber once per process. Honors `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Client pointed at a mock server with fast retries.
pub fn client_for(server: &MockServer, retries: u32) -> SignTuskClient {
    client_with_timeout(server, retries, Duration::from_secs(5))
}

pub fn client_with_timeout(server: &MockServer, retries: u32, timeout: Duration) -> SignTuskClient {
    init_tracing();
    let config = SdkConfig::builder()
        .api_key("sk_test_integration")
        .base_url(server.uri())
        .timeout(timeout)
        .retry_count(retries)
        .retry_delay(Duration::from_millis(10))
        .build()
        .expect("valid test configuration");
    SignTuskClient::new(config).expect("client construction")
}
