//! Standalone mock Tigo Pesa provider for local development.

use mock_tigopesa::{MockProvider, DEFAULT_TOKEN_TTL_SECS};
use tracing::info;

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let port: u16 = env_or("MOCK_TIGOPESA_PORT", "4100").parse()?;
    let ttl: i64 = env_or(
        "MOCK_TIGOPESA_TOKEN_TTL_SECS",
        &DEFAULT_TOKEN_TTL_SECS.to_string(),
    )
    .parse()?;

    // Same variables the SDK reads, so a shared .env works for both.
    let provider = MockProvider::new(
        env_or("TIGO_PUSH_USERNAME", ""),
        env_or("TIGO_PUSH_PASSWORD", ""),
    )
    .with_token_ttl(ttl);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, token_ttl_secs = ttl, "mock tigo pesa provider listening");
    axum::serve(listener, provider.router()).await?;
    Ok(())
}
