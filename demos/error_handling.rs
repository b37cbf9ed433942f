//! Error handling examples
//!
//! Shows how the SDK reports failures:
//! - Configuration errors before any request is sent
//! - Typed API errors with status, message and request id
//! - Rate limiting and server errors after automatic retries
//! - Network failures and timeouts
//!
//! Run with:
//!   SIGNTUSK_API_KEY=... RUST_LOG=signtusk_client=debug cargo run --example error_handling

use signtusk_sdk::{Error, ErrorKind, RawConfig, SdkConfig, SignTuskClient};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== SignTusk Error Handling Examples ===\n");

    example_configuration_error();

    let client = SignTuskClient::new(SdkConfig::from_env()?)?;

    example_not_found(&client).await;
    example_error_categorization(&client).await;
    example_network_error().await;

    client.close();
    println!("\n✓ All error handling examples completed!");

    Ok(())
}

/// Example 1: configuration is validated before anything touches the network
fn example_configuration_error() {
    println!("Example 1: Configuration Errors");
    println!("-------------------------------");

    match SdkConfig::from_raw(RawConfig::default()) {
        Ok(_) => println!("✗ Unexpectedly accepted an empty configuration"),
        Err(e) => {
            println!("✓ Rejected: {}", e);
            assert!(matches!(e.kind, ErrorKind::Config(_)));
        }
    }

    println!();
}

/// Example 2: a missing resource
async fn example_not_found(client: &SignTuskClient) {
    println!("Example 2: Not Found");
    println!("--------------------");

    match client.get("/api/v1/documents/doc_does_not_exist").await {
        Ok(response) => println!("✓ Found document ({} bytes)", response.bytes().len()),
        Err(e) => {
            println!("✗ {}", e);
            println!("  status:     {:?}", e.status());
            println!("  request id: {:?}", e.request_id());
            println!("  retryable:  {}", e.is_retryable());
        }
    }

    println!();
}

/// Example 3: deciding what to do with an error
async fn example_error_categorization(client: &SignTuskClient) {
    println!("Example 3: Error Categorization");
    println!("-------------------------------");

    let result = client
        .post("/api/v1/documents", &serde_json::json!({"title": ""}))
        .await;

    match result {
        Ok(response) => println!("✓ Created (status {})", response.status()),
        Err(e) => println!("✗ {}\n  → {}", e, advice(&e)),
    }

    println!();
}

fn advice(error: &Error) -> &'static str {
    match &error.kind {
        ErrorKind::Authentication(_) => "check the API key or refresh the token",
        ErrorKind::Authorization(_) => "the credential lacks permission for this resource",
        ErrorKind::Validation(_) => "fix the request payload",
        ErrorKind::NotFound(_) => "the resource does not exist",
        ErrorKind::Conflict(_) => "reload the resource and retry the change",
        ErrorKind::RateLimited(_) => "back off; retries were already attempted",
        ErrorKind::Server(_) => "platform problem; retries were already attempted",
        ErrorKind::Network(_) | ErrorKind::Timeout(_) => "check connectivity",
        _ => "unexpected error",
    }
}

/// Example 4: transport failures surface as Network or Timeout
async fn example_network_error() {
    println!("Example 4: Network Errors");
    println!("-------------------------");

    let config = SdkConfig::builder()
        .api_key("sk_demo")
        .base_url("http://127.0.0.1:9")
        .retry_count(1)
        .retry_delay(std::time::Duration::from_millis(100))
        .build();

    let client = match config.and_then(SignTuskClient::new) {
        Ok(client) => client,
        Err(e) => {
            println!("✗ Could not build client: {}", e);
            return;
        }
    };

    match client.get("/api/v1/documents").await {
        Ok(_) => println!("✗ Unexpected success"),
        Err(e) if e.is_network() || e.is_timeout() => println!("✓ Transport failure: {}", e),
        Err(e) => println!("✗ Unexpected error: {}", e),
    }

    println!();
}
