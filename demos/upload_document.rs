//! Upload a document and send it for signature.
//!
//! Run with:
//!   SIGNTUSK_API_KEY=... cargo run --example upload_document -- path/to/file.pdf

use serde::Deserialize;
use signtusk_sdk::{FilePart, SignTuskClient};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Deserialize)]
struct Document {
    id: String,
    #[serde(default)]
    status: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let path = std::env::args()
        .nth(1)
        .ok_or("usage: upload_document <file>")?;
    let data = tokio::fs::read(&path).await?;
    let file_name = std::path::Path::new(&path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("document.pdf")
        .to_string();

    let client = SignTuskClient::from_env()?;
    println!("Uploading {} ({} bytes) to {}", file_name, data.len(), client.base_url());

    let file = FilePart::new(data)
        .with_file_name(file_name.clone())
        .with_content_type("application/pdf");

    let response = client
        .upload_file("/api/v1/documents/upload", file, [("title", file_name.as_str())])
        .await?;
    let document: Document = response.json()?;
    println!(
        "✓ Uploaded document {} (status {:?}, request id {:?})",
        document.id,
        document.status,
        response.request_id()
    );

    let sent: serde_json::Value = client
        .post_json(
            &format!("/api/v1/documents/{}/send", document.id),
            &serde_json::json!({}),
        )
        .await?;
    println!("✓ Sent for signature: {}", sent);

    client.close();
    Ok(())
}
