//! What the display shows at any moment

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{
    display::Palette,
    engine::{Phase, Tick, TimerMode, TimerState, EXPIRED_DISPLAY},
};

pub const IDLE_LABEL: &str = "Timer not started";
pub const EXPIRED_LABEL: &str = "Timer Ended!";

/// Countdown bookkeeping guarded by a single lock
#[derive(Debug, Clone, Default)]
pub struct Countdown {
    pub timer: TimerState,
    /// Mode of the current or most recent run
    pub mode: Option<TimerMode>,
    pub last_tick: Option<Tick>,
}

/// Snapshot rendered by the display and reported by the control panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayState {
    pub text: String,
    pub is_warning: bool,
    pub expired: bool,
    pub running: bool,
    pub visible: bool,
    pub label: String,
    pub phase: Phase,
    pub end_time: Option<NaiveDateTime>,
    pub palette: Palette,
}

impl DisplayState {
    /// Display before any timer has been started
    pub fn idle(palette: Palette, visible: bool) -> Self {
        Self::compose(&Countdown::default(), palette, visible)
    }

    pub fn compose(countdown: &Countdown, palette: Palette, visible: bool) -> Self {
        let phase = countdown.timer.phase();
        let label = match (phase, countdown.mode) {
            (Phase::Idle, _) | (_, None) => IDLE_LABEL.to_string(),
            (Phase::Expired, _) => EXPIRED_LABEL.to_string(),
            (_, Some(mode)) => mode.label(),
        };
        let text = countdown
            .last_tick
            .as_ref()
            .map(|tick| tick.display.clone())
            .unwrap_or_else(|| EXPIRED_DISPLAY.to_string());

        Self {
            text,
            is_warning: countdown.timer.is_warning,
            expired: countdown.timer.is_expired,
            running: countdown.timer.is_running,
            visible,
            label,
            phase,
            end_time: countdown.timer.end_time,
            palette,
        }
    }
}
