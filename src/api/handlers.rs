//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use tracing::{error, info, warn};

use crate::{
    display::PaletteUpdate,
    engine::TimerMode,
    state::AppState,
};
use super::responses::{ApiResponse, HealthResponse, PresetsResponse, StatusResponse};

/// Handle POST /timer/start - Start a countdown in the given mode
pub async fn start_handler(
    State(state): State<Arc<AppState>>,
    Json(mode): Json<TimerMode>,
) -> Result<Json<ApiResponse>, (StatusCode, String)> {
    if let Err(e) = mode.validate() {
        warn!("Rejected timer mode {:?}: {}", mode, e);
        return Err((StatusCode::UNPROCESSABLE_ENTITY, e.to_string()));
    }

    match state.start_timer(mode) {
        Ok(display) => {
            info!("Start endpoint called - {}", mode.label());
            Ok(Json(ApiResponse::new(format!("{} started", mode.label()), display)))
        }
        Err(e) => {
            error!("Failed to start timer: {}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, e))
        }
    }
}

/// Handle POST /timer/stop - Stop ticking and keep the current display
pub async fn stop_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    match state.stop_timer() {
        Ok(display) => {
            info!("Stop endpoint called");
            Ok(Json(ApiResponse::new("Timer stopped".to_string(), display)))
        }
        Err(e) => {
            error!("Failed to stop timer: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /timer/reset - Clear the timer
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    match state.reset_timer() {
        Ok(display) => {
            info!("Reset endpoint called");
            Ok(Json(ApiResponse::new("Timer reset".to_string(), display)))
        }
        Err(e) => {
            error!("Failed to reset timer: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle GET /timer/presets - List the built-in modes
pub async fn presets_handler() -> Json<PresetsResponse> {
    Json(PresetsResponse::builtin())
}

/// Handle PUT /display/colors - Change some or all display colors
pub async fn colors_handler(
    State(state): State<Arc<AppState>>,
    Json(update): Json<PaletteUpdate>,
) -> Result<Json<ApiResponse>, StatusCode> {
    if let Err(e) = state.set_palette(&update) {
        error!("Failed to update palette: {}", e);
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    Ok(Json(ApiResponse::new(
        "Display colors updated".to_string(),
        state.get_display_state(),
    )))
}

/// Handle POST /display/toggle - Show or hide the display
pub async fn toggle_display_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    match state.toggle_display() {
        Ok(display) => {
            let message = if display.visible { "Display shown" } else { "Display hidden" };
            Ok(Json(ApiResponse::new(message.to_string(), display)))
        }
        Err(e) => {
            error!("Failed to toggle display: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle GET /status - Return current timer and display status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, StatusCode> {
    let timer = match state.get_timer_state() {
        Ok(t) => t,
        Err(e) => {
            error!("Failed to get timer state: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let mode = state.get_active_mode().map_err(|e| {
        error!("Failed to get active mode: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let palette = state.get_palette().map_err(|e| {
        error!("Failed to get palette: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        display: state.get_display_state(),
        timer,
        mode,
        palette,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
