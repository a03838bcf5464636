use std::sync::Arc;

use pdf_cover_server::{AppConfig, AppState, router};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    info!("Starting pdfcover server v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load()?;
    info!(
        host = %config.server.host,
        port = config.server.port,
        upload_dir = %config.storage.upload_dir.display(),
        output_dir = %config.storage.output_dir.display(),
        "Configuration loaded"
    );

    tokio::fs::create_dir_all(&config.storage.upload_dir).await?;
    tokio::fs::create_dir_all(&config.storage.output_dir).await?;

    let address = config.bind_address();
    let state = AppState::new(config);
    if state.rasterizer().is_none() {
        tracing::warn!("Built without a rasterizer; uploads will not include thumbnails");
    }
    let app = router(Arc::new(state));

    let listener = TcpListener::bind(&address).await?;
    info!(%address, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}

fn init_logging() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let format = fmt::format().with_target(true).compact();

    // Use RUST_LOG if set, otherwise default to info level for our crates
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("pdf_cover_server=info,pdfcover_server=info,pdf_cover=info,tower_http=info")
    });

    tracing_subscriber::registry()
        .with(fmt::layer().event_format(format))
        .with(filter)
        .init();
}
