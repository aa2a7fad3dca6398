// Connect Simulator
// Serves a simulated STK instance over the Connect protocol

use anyhow::Result;
use stk_connect::client::DEFAULT_PORT;
use stk_connect::server::ConnectServer;
use stk_connect::StkVersion;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "connect_sim=info,stk_connect=info".to_string()),
        )
        .init();

    // Load configuration from environment
    let address = std::env::var("CONNECT_SIM_ADDR")
        .unwrap_or_else(|_| format!("0.0.0.0:{}", DEFAULT_PORT));
    let version = std::env::var("CONNECT_SIM_VERSION").unwrap_or_else(|_| "11.6.0".to_string());

    if !StkVersion::FALLBACK_ORDER.iter().any(|v| v.matches(&version)) {
        warn!("Reporting version {} which no client will accept", version);
    }

    let server = ConnectServer::bind(&address, &version).await?;
    info!("Simulated STK {} on {}", version, server.local_addr()?);

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => info!("Shutting down"),
    }

    Ok(())
}
