//! Main application state management

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use crate::{
    display::{Palette, PaletteUpdate},
    engine::{self, Clock, Tick, TimerMode, TimerState},
};
use super::{Countdown, DisplayState};

/// Lifecycle notifications consumed by the ticker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    Started,
    Stopped,
    Reset,
}

/// Shared state behind the control panel, the ticker and the display
#[derive(Debug)]
pub struct AppState {
    /// Wall-clock source for every engine call
    pub clock: Arc<dyn Clock>,
    /// Countdown state and the mode it was started with
    pub countdown: Arc<Mutex<Countdown>>,
    /// Display settings
    pub palette: Arc<Mutex<Palette>>,
    pub display_visible: Arc<Mutex<bool>>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
    /// Start / stop / reset notifications for the ticker
    pub control_tx: broadcast::Sender<ControlEvent>,
    /// Latest display snapshot
    pub display_tx: watch::Sender<DisplayState>,
    /// Keep the receiver alive to prevent channel closure
    pub _display_rx: watch::Receiver<DisplayState>,
}

impl AppState {
    /// Create a new AppState with an idle timer
    pub fn new(port: u16, host: String, clock: Arc<dyn Clock>, palette: Palette) -> Self {
        let (control_tx, _) = broadcast::channel(16);
        let (display_tx, display_rx) = watch::channel(DisplayState::idle(palette, true));

        Self {
            clock,
            countdown: Arc::new(Mutex::new(Countdown::default())),
            palette: Arc::new(Mutex::new(palette)),
            display_visible: Arc::new(Mutex::new(true)),
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
            control_tx,
            display_tx,
            _display_rx: display_rx,
        }
    }

    /// Apply a change to the countdown and publish the resulting display.
    ///
    /// The countdown lock is held while the display is composed, so the
    /// palette and visibility locks are always taken after it.
    fn update_countdown<F, T>(&self, updater: F) -> Result<(T, DisplayState), String>
    where
        F: FnOnce(&mut Countdown) -> T,
    {
        let mut countdown = self.countdown.lock()
            .map_err(|e| format!("Failed to lock countdown state: {}", e))?;

        let result = updater(&mut countdown);
        let display = self.compose(&countdown)?;
        drop(countdown); // Release the lock early

        self.publish(display.clone());
        Ok((result, display))
    }

    fn compose(&self, countdown: &Countdown) -> Result<DisplayState, String> {
        let palette = self.get_palette()?;
        let visible = self.is_display_visible()?;
        Ok(DisplayState::compose(countdown, palette, visible))
    }

    fn publish(&self, display: DisplayState) {
        if let Err(e) = self.display_tx.send(display) {
            warn!("Failed to send display update: {}", e);
        }
    }

    fn notify(&self, event: ControlEvent) {
        // No subscribers simply means no ticker is running
        if let Err(e) = self.control_tx.send(event) {
            debug!("No listener for control event: {}", e);
        }
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Start a countdown in `mode`, replacing any run in progress
    pub fn start_timer(&self, mode: TimerMode) -> Result<DisplayState, String> {
        let now = self.clock.now();
        let (end_time, display) = self.update_countdown(|countdown| {
            let end_time = countdown.timer.begin(&mode, now);
            countdown.mode = Some(mode);
            countdown.last_tick = countdown.timer.advance(now);
            end_time
        })?;

        info!("Timer started: {} (ends at {})", mode.label(), end_time);
        self.record_action("start");
        self.notify(ControlEvent::Started);
        Ok(display)
    }

    /// Stop ticking, keeping the last rendered time on the display
    pub fn stop_timer(&self) -> Result<DisplayState, String> {
        let (_, display) = self.update_countdown(|countdown| countdown.timer.stop())?;

        let shown = &display.text;
        info!("Timer stopped at {}", shown);
        self.record_action("stop");
        self.notify(ControlEvent::Stopped);
        Ok(display)
    }

    /// Clear the countdown back to its initial state
    pub fn reset_timer(&self) -> Result<DisplayState, String> {
        let (_, display) = self.update_countdown(|countdown| {
            *countdown = Countdown {
                timer: engine::reset(),
                mode: None,
                last_tick: None,
            };
        })?;

        info!("Timer reset");
        self.record_action("reset");
        self.notify(ControlEvent::Reset);
        Ok(display)
    }

    /// Advance the countdown to the current time.
    ///
    /// Returns `None` when no countdown is running.
    pub fn tick(&self) -> Result<Option<Tick>, String> {
        let now = self.clock.now();
        let mut countdown = self.countdown.lock()
            .map_err(|e| format!("Failed to lock countdown state: {}", e))?;

        let Some(tick) = countdown.timer.advance(now) else {
            return Ok(None);
        };
        countdown.last_tick = Some(tick.clone());
        let display = self.compose(&countdown)?;
        drop(countdown);

        debug!("Tick: {} (warning={})", tick.display, tick.is_warning);
        if tick.expired {
            info!("Timer ended");
        }
        self.publish(display);
        Ok(Some(tick))
    }

    /// Change some or all display colors
    pub fn set_palette(&self, update: &PaletteUpdate) -> Result<Palette, String> {
        let mut palette = self.palette.lock()
            .map_err(|e| format!("Failed to lock palette: {}", e))?;
        palette.apply(update);
        let new_palette = *palette;
        drop(palette);

        info!(
            "Palette set to normal={}, warning={}, background={}",
            new_palette.normal, new_palette.warning, new_palette.background
        );
        self.record_action("colors");
        self.refresh()?;
        Ok(new_palette)
    }

    /// Show or hide the display
    pub fn set_display_visible(&self, visible: bool) -> Result<DisplayState, String> {
        let mut current = self.display_visible.lock()
            .map_err(|e| format!("Failed to lock display visibility: {}", e))?;
        *current = visible;
        drop(current);

        info!("Display {}", if visible { "shown" } else { "hidden" });
        self.record_action(if visible { "show" } else { "hide" });
        self.refresh()
    }

    pub fn toggle_display(&self) -> Result<DisplayState, String> {
        let visible = self.is_display_visible()?;
        self.set_display_visible(!visible)
    }

    /// Re-publish the display after a settings change
    fn refresh(&self) -> Result<DisplayState, String> {
        let (_, display) = self.update_countdown(|_| ())?;
        Ok(display)
    }

    /// Get current timer state
    pub fn get_timer_state(&self) -> Result<TimerState, String> {
        self.countdown.lock()
            .map(|countdown| countdown.timer.clone())
            .map_err(|e| format!("Failed to lock countdown state: {}", e))
    }

    /// Get the mode of the current or most recent run
    pub fn get_active_mode(&self) -> Result<Option<TimerMode>, String> {
        self.countdown.lock()
            .map(|countdown| countdown.mode)
            .map_err(|e| format!("Failed to lock countdown state: {}", e))
    }

    pub fn get_palette(&self) -> Result<Palette, String> {
        self.palette.lock()
            .map(|palette| *palette)
            .map_err(|e| format!("Failed to lock palette: {}", e))
    }

    pub fn is_display_visible(&self) -> Result<bool, String> {
        self.display_visible.lock()
            .map(|visible| *visible)
            .map_err(|e| format!("Failed to lock display visibility: {}", e))
    }

    /// Latest published display snapshot
    pub fn get_display_state(&self) -> DisplayState {
        self.display_tx.borrow().clone()
    }

    /// Receiver that wakes on every display change
    pub fn subscribe_display(&self) -> watch::Receiver<DisplayState> {
        self.display_tx.subscribe()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    use crate::{
        display::Rgb,
        engine::{ManualClock, Phase},
        state::{EXPIRED_LABEL, IDLE_LABEL},
    };

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn state_at(now: NaiveDateTime) -> (Arc<ManualClock>, AppState) {
        let clock = Arc::new(ManualClock::new(now));
        let state = AppState::new(0, "127.0.0.1".to_string(), clock.clone(), Palette::default());
        (clock, state)
    }

    #[test]
    fn start_renders_immediately() {
        let (_, state) = state_at(at(10, 0, 0));
        let display = state.start_timer(TimerMode::FixedDuration { seconds: 30 * 60 }).unwrap();

        assert_eq!(display.text, "00:30:00");
        assert_eq!(display.label, "30 Minute Timer");
        assert_eq!(display.phase, Phase::Running);
        assert_eq!(state.get_display_state(), display);
        assert_eq!(state.get_last_action().0.as_deref(), Some("start"));
    }

    #[test]
    fn ticks_into_warning_then_expires_once() {
        let (clock, state) = state_at(at(10, 0, 0));
        state.start_timer(TimerMode::FixedDuration { seconds: 30 * 60 }).unwrap();

        clock.set(at(10, 25, 1));
        let tick = state.tick().unwrap().unwrap();
        assert_eq!(tick.display, "00:04:59");
        assert!(tick.is_warning);
        assert_eq!(state.get_display_state().phase, Phase::Warning);

        clock.set(at(10, 30, 0));
        let tick = state.tick().unwrap().unwrap();
        assert!(tick.expired);

        let display = state.get_display_state();
        assert_eq!(display.text, "00:00:00");
        assert_eq!(display.label, EXPIRED_LABEL);
        assert!(display.is_warning);
        assert!(!display.running);

        clock.advance(Duration::seconds(1));
        assert_eq!(state.tick().unwrap(), None);
    }

    #[test]
    fn stop_freezes_the_display() {
        let (clock, state) = state_at(at(10, 0, 0));
        state.start_timer(TimerMode::FixedDuration { seconds: 600 }).unwrap();
        clock.advance(Duration::seconds(10));
        state.tick().unwrap();

        let display = state.stop_timer().unwrap();
        assert_eq!(display.text, "00:09:50");
        assert_eq!(display.phase, Phase::Stopped);

        clock.advance(Duration::seconds(10));
        assert_eq!(state.tick().unwrap(), None);
        assert_eq!(state.get_display_state().text, "00:09:50");
    }

    #[test]
    fn reset_twice_is_a_no_op() {
        let (_, state) = state_at(at(10, 0, 0));
        state.start_timer(TimerMode::CustomClockTarget { hour: 11, minute: 0 }).unwrap();

        let first = state.reset_timer().unwrap();
        let second = state.reset_timer().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.label, IDLE_LABEL);
        assert_eq!(state.get_timer_state().unwrap(), TimerState::default());
        assert_eq!(state.get_active_mode().unwrap(), None);
    }

    #[test]
    fn control_events_are_broadcast() {
        let (_, state) = state_at(at(10, 0, 0));
        let mut rx = state.control_tx.subscribe();

        state.start_timer(TimerMode::FixedDuration { seconds: 60 }).unwrap();
        state.stop_timer().unwrap();
        state.reset_timer().unwrap();

        assert_eq!(rx.try_recv().unwrap(), ControlEvent::Started);
        assert_eq!(rx.try_recv().unwrap(), ControlEvent::Stopped);
        assert_eq!(rx.try_recv().unwrap(), ControlEvent::Reset);
    }

    #[test]
    fn palette_and_visibility_republish_display() {
        let (_, state) = state_at(at(10, 0, 0));
        let mut rx = state.subscribe_display();

        let update = PaletteUpdate {
            normal: Some(Rgb::new(0, 255, 0)),
            ..PaletteUpdate::default()
        };
        state.set_palette(&update).unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().palette.normal, Rgb::new(0, 255, 0));

        let display = state.toggle_display().unwrap();
        assert!(!display.visible);
        assert!(state.toggle_display().unwrap().visible);
    }
}
