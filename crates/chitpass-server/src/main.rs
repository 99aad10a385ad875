//! Standalone chitpass server binary.
//!
//! Usage: `chitpass-server [bind-addr]` (default `0.0.0.0:8080`).
//! Log verbosity follows `RUST_LOG`.

use chitpass_server::ChitpassServerBuilder;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let addr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "0.0.0.0:8080".to_string());

    let server = ChitpassServerBuilder::new().bind(&addr).build().await?;
    tracing::info!(%addr, "chitpass server listening");
    server.run().await?;
    Ok(())
}
