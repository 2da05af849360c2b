//! Countdown Timer - a start/pause/resume/stop countdown served over HTTP
//!
//! This is the main entry point for the countdown-timer service.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

use countdown_timer::{
    api::create_router,
    config::Config,
    state::AppState,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("countdown_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting countdown-timer server v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: host={}, port={}, tick={}ms, channel_capacity={}",
        config.host, config.port, config.tick_ms, config.channel_capacity
    );

    // One engine and one orchestrator for the life of the process
    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        config.tick_period(),
        config.tick_capacity(),
    ));

    let app = create_router(Arc::clone(&state));

    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /timer/start  - Start a countdown ({{\"seconds\": n}})");
    info!("  POST /timer/pause  - Pause the countdown");
    info!("  POST /timer/resume - Resume a paused countdown");
    info!("  POST /timer/stop   - Cancel the countdown");
    info!("  GET  /timer        - Current timer state");
    info!("  GET  /status       - Timer state and server info");
    info!("  GET  /health       - Health check");

    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    if let Err(e) = state.shutdown().await {
        error!("Failed to shut down timer: {}", e);
    }

    info!("Server shutdown complete");
    Ok(())
}
