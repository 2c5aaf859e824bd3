//! Tigo Pesa merchant gateway: serves the name-check, payment and callback
//! routes the provider calls.

use tigopesa_sdk::{Config, TigoClient};
use tracing::info;

mod handlers;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Structured logging (RUST_LOG)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    let paths = config.inbound.clone();
    let client = TigoClient::new(config, handlers::handlers())?;

    let port: u16 = std::env::var("GATEWAY_PORT")
        .unwrap_or_else(|_| "3001".to_string())
        .parse()?;
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        address = %addr,
        name_check = %paths.name_check_path,
        payment = %paths.payment_path,
        callback = %paths.callback_path,
        "gateway listening"
    );
    axum::serve(listener, client.router()).await?;
    Ok(())
}
