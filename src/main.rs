use anyhow::Result;
use tracing::info;
use user_portal::{create_router, init_tracing, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    dotenvy::dotenv().ok();
    init_tracing();
    info!("Starting user portal v{}...", env!("CARGO_PKG_VERSION"));

    let server = ServerConfig::from_env()?;
    let app = create_router().await?;

    info!("Starting at endpoint:{}", server.bind_addr);
    let listener = tokio::net::TcpListener::bind(&server.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    // ---
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
