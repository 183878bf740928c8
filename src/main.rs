use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

use site_lang::{config::Config, server};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("site_lang=info".parse()?),
        )
        .init();

    info!("Starting site language server");

    let config = Config::from_env()?;

    if !config.site_dir.is_dir() {
        warn!(
            "Site directory {} does not exist, pages will return 404",
            config.site_dir.display()
        );
    }

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!(
        "Serving {} on http://{}",
        config.site_dir.display(),
        addr
    );

    let app = server::create_router(Arc::new(config));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
