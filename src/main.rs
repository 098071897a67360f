use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;
use worldcast::api::create_app;
use worldcast::config::{load_from_env, new_runtime_config};
use worldcast::state::{run_stats_reporter, WorldEngine};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "worldcast=info".into()),
        )
        .init();

    info!("Worldcast starting...");

    let config = load_from_env().context("Failed to load configuration")?;
    let runtime_config = new_runtime_config();

    info!(
        bind = %config.server.bind_addr(),
        static_dir = %config.server.static_dir.display(),
        report_interval_seconds = config.stats.report_interval_seconds,
        "Configuration loaded"
    );

    let engine = Arc::new(WorldEngine::new());

    if config.stats.report_interval_seconds > 0 {
        tokio::spawn(run_stats_reporter(
            Arc::clone(&engine),
            config.stats.report_interval_seconds,
        ));
    }

    let router = create_app(engine, runtime_config, &config.server.static_dir);
    let listener = tokio::net::TcpListener::bind(config.server.bind_addr())
        .await
        .context("Failed to bind listener")?;
    info!(addr = %config.server.bind_addr(), "Worldcast listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Worldcast stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for ctrl_c signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
