use std::time::Duration;

use eval_mock_server::MockOptions;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let latency_ms: u64 = match std::env::var("MOCK_LATENCY_MS") {
        Ok(raw) => raw.parse()?,
        Err(_) => 0,
    };

    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    info!("listening on {addr} (latency {latency_ms}ms)");
    eval_mock_server::run(
        listener,
        MockOptions {
            latency: Duration::from_millis(latency_ms),
        },
    )
    .await?;
    Ok(())
}
