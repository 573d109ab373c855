//! Class Timer - A classroom countdown timer
//!
//! This is the main entry point for the class-timer application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use class_timer::{
    api::create_router,
    config::Config,
    display::{display_task, wait_for_quit_key},
    engine::SystemClock,
    state::AppState,
    tasks::countdown_task,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Logs go to stderr so they stay out of the display on stdout
    tracing_subscriber::fmt()
        .with_env_filter(format!("class_timer={},tower_http=info", config.log_level()))
        .with_writer(std::io::stderr)
        .init();

    info!("Starting class-timer v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, display={}",
          config.host, config.port, !config.no_display);

    // Create application state
    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        Arc::new(SystemClock),
        config.palette(),
    ));

    // Start the countdown ticker
    let control_rx = state.control_tx.subscribe();
    tokio::spawn(countdown_task(Arc::clone(&state), control_rx));

    // Start the terminal display unless running headless
    let display = if config.no_display {
        None
    } else {
        Some(tokio::spawn(display_task(state.subscribe_display())))
    };

    if let Some(mode) = config.start {
        state.start_timer(mode).map_err(anyhow::Error::msg)?;
    }

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Control panel running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /timer/start     - Start a countdown (JSON timer mode)");
    info!("  POST /timer/stop      - Stop the countdown");
    info!("  POST /timer/reset     - Reset the countdown");
    info!("  GET  /timer/presets   - List built-in timer modes");
    info!("  PUT  /display/colors  - Change display colors");
    info!("  POST /display/toggle  - Show or hide the display");
    info!("  GET  /status          - Current timer and display status");
    info!("  GET  /health          - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    // The display runs in raw mode, so Ctrl-C there is a key press, not a signal
    let quit_key = async {
        if config.no_display {
            std::future::pending::<()>().await
        } else {
            wait_for_quit_key().await
        }
    };

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = quit_key => {
            info!("Quit requested from the display");
        }
        result = shutdown_signal() => {
            match result {
                Ok(_) => info!("Shutdown signal received"),
                Err(e) => tracing::error!("Signal handling failed: {}", e),
            }
        }
    }

    // Dropping the display task restores the terminal
    if let Some(handle) = display {
        handle.abort();
        let _ = handle.await;
    }

    info!("Shutdown complete");
    Ok(())
}
