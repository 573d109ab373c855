//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    display::Palette,
    engine::{Phase, TimerMode, TimerState},
    state::DisplayState,
};

/// API response structure for timer and display actions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: Phase,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub display: DisplayState,
}

impl ApiResponse {
    /// Create a new API response; the status mirrors the display's phase
    pub fn new(message: String, display: DisplayState) -> Self {
        Self {
            status: display.phase,
            message,
            timestamp: Utc::now(),
            display,
        }
    }
}

/// Full status of the timer and display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub display: DisplayState,
    pub timer: TimerState,
    pub mode: Option<TimerMode>,
    pub palette: Palette,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// A selectable built-in mode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preset {
    pub label: String,
    pub mode: TimerMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetsResponse {
    pub presets: Vec<Preset>,
}

impl PresetsResponse {
    pub fn builtin() -> Self {
        Self {
            presets: TimerMode::presets()
                .into_iter()
                .map(|mode| Preset { label: mode.label(), mode })
                .collect(),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
