//! Countdown computation: end time derivation, per-second ticks, expiry

use chrono::{Duration, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use super::TimerMode;

/// Remaining time at or below which the display switches to the warning color
pub const WARNING_THRESHOLD_SECS: i64 = 300;

/// Length substituted for a countdown of zero length
pub const ZERO_DURATION_FALLBACK_SECS: i64 = 60;

/// Rendering of an expired countdown
pub const EXPIRED_DISPLAY: &str = "00:00:00";

/// Output of a single tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tick {
    pub display: String,
    pub is_warning: bool,
    pub expired: bool,
}

impl Tick {
    fn expired() -> Self {
        Self {
            display: EXPIRED_DISPLAY.to_string(),
            is_warning: true,
            expired: true,
        }
    }
}

/// Coarse lifecycle position of a timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Running,
    Warning,
    Stopped,
    Expired,
}

/// Countdown state owned by whoever drives the ticks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub end_time: Option<NaiveDateTime>,
    pub is_running: bool,
    pub is_warning: bool,
    pub is_expired: bool,
}

impl TimerState {
    /// Create a cleared timer state
    pub fn new() -> Self {
        reset()
    }

    /// Start a run of `mode` at `now`, replacing any previous run
    pub fn begin(&mut self, mode: &TimerMode, now: NaiveDateTime) -> NaiveDateTime {
        let end_time = start(mode, now);
        *self = Self {
            end_time: Some(end_time),
            is_running: true,
            is_warning: tick(end_time, now).is_warning,
            is_expired: false,
        };
        end_time
    }

    /// Tick a running timer.
    ///
    /// Returns `None` when the timer is not running. The transition to
    /// expired clears `is_running`, so expiry is reported exactly once.
    pub fn advance(&mut self, now: NaiveDateTime) -> Option<Tick> {
        if !self.is_running {
            return None;
        }
        let end_time = self.end_time?;

        let tick = tick(end_time, now);
        self.is_warning = tick.is_warning;
        if tick.expired {
            self.is_running = false;
            self.is_expired = true;
        }
        Some(tick)
    }

    /// Stop ticking; the end time and last warning flag are kept
    pub fn stop(&mut self) {
        self.is_running = false;
    }

    pub fn phase(&self) -> Phase {
        match (self.end_time, self.is_running) {
            (None, _) => Phase::Idle,
            (Some(_), true) if self.is_warning => Phase::Warning,
            (Some(_), true) => Phase::Running,
            (Some(_), false) if self.is_expired => Phase::Expired,
            (Some(_), false) => Phase::Stopped,
        }
    }
}

/// Compute the absolute end time of `mode` started at `now`.
///
/// Clock targets resolve to today's date, or tomorrow when the target is not
/// strictly after `now`.
pub fn start(mode: &TimerMode, now: NaiveDateTime) -> NaiveDateTime {
    debug_assert!(mode.validate().is_ok(), "unvalidated timer mode {:?}", mode);

    if let Some((hour, minute)) = mode.clock_target() {
        // Out of range targets only get here unvalidated; they expire at once
        let Some(time) = NaiveTime::from_hms_opt(hour, minute, 0) else {
            return now;
        };
        let target = now.date().and_time(time);
        return if target > now {
            target
        } else {
            target + Duration::days(1)
        };
    }

    let duration = mode
        .duration()
        .unwrap_or_else(|| Duration::seconds(ZERO_DURATION_FALLBACK_SECS));
    now.checked_add_signed(duration).unwrap_or(NaiveDateTime::MAX)
}

/// Remaining time until `end_time`, as seen at `now`
pub fn tick(end_time: NaiveDateTime, now: NaiveDateTime) -> Tick {
    let remaining = end_time - now;
    if remaining <= Duration::zero() {
        return Tick::expired();
    }

    // num_seconds truncates, which is floor for a positive delta
    let total_seconds = u64::try_from(remaining.num_seconds()).unwrap_or_default();
    Tick {
        display: format_hms(total_seconds),
        is_warning: remaining <= Duration::seconds(WARNING_THRESHOLD_SECS),
        expired: false,
    }
}

/// The initial, cleared state
pub fn reset() -> TimerState {
    TimerState {
        end_time: None,
        is_running: false,
        is_warning: false,
        is_expired: false,
    }
}

/// Format seconds as "HH:MM:SS"; hours are not wrapped at a day
pub fn format_hms(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn clock_target_later_today_stays_today() {
        let now = at(8, 0, 0);
        let end = start(&TimerMode::FixedClockTarget { hour: 8, minute: 30 }, now);
        assert_eq!(end, at(8, 30, 0));

        let end = start(&TimerMode::CustomClockTarget { hour: 23, minute: 59 }, now);
        assert_eq!(end, at(23, 59, 0));
    }

    #[test]
    fn clock_target_already_passed_rolls_to_tomorrow() {
        let now = at(11, 0, 0);
        let end = start(&TimerMode::FixedClockTarget { hour: 10, minute: 50 }, now);
        assert_eq!(end, at(10, 50, 0) + Duration::days(1));
        assert_eq!(end.date(), NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
    }

    #[test]
    fn clock_target_equal_to_now_rolls_to_tomorrow() {
        let now = at(9, 0, 0);
        let end = start(&TimerMode::CustomClockTarget { hour: 9, minute: 0 }, now);
        assert_eq!(end, at(9, 0, 0) + Duration::days(1));
    }

    #[test]
    fn clock_target_within_the_same_minute_rolls_to_tomorrow() {
        let now = at(9, 0, 30);
        let end = start(&TimerMode::CustomClockTarget { hour: 9, minute: 0 }, now);
        assert_eq!(end, at(9, 0, 0) + Duration::days(1));
    }

    #[test]
    fn duration_modes_add_to_now() {
        let now = at(10, 0, 0);
        let end = start(&TimerMode::FixedDuration { seconds: 45 * 60 }, now);
        assert_eq!(end - now, Duration::seconds(2700));

        let end = start(
            &TimerMode::CustomDuration { hours: 1, minutes: 2, seconds: 3 },
            now,
        );
        assert_eq!(end - now, Duration::seconds(3723));
    }

    #[test]
    fn zero_custom_duration_becomes_one_minute() {
        let now = at(10, 0, 0);
        let end = start(
            &TimerMode::CustomDuration { hours: 0, minutes: 0, seconds: 0 },
            now,
        );
        assert_eq!(end - now, Duration::seconds(60));
    }

    #[test]
    fn tick_is_deterministic() {
        let end = at(10, 30, 0);
        let now = at(10, 12, 34);
        assert_eq!(tick(end, now), tick(end, now));
    }

    #[test]
    fn warning_threshold_boundary() {
        let end = at(10, 30, 0);

        let before = tick(end, end - Duration::seconds(301));
        assert_eq!(before.display, "00:05:01");
        assert!(!before.is_warning);

        let at_threshold = tick(end, end - Duration::seconds(300));
        assert_eq!(at_threshold.display, "00:05:00");
        assert!(at_threshold.is_warning);

        let after = tick(end, end - Duration::seconds(1));
        assert!(after.is_warning);
        assert!(!after.expired);
    }

    #[test]
    fn expiry_at_and_after_end_time() {
        let end = at(10, 30, 0);
        let expected = Tick {
            display: "00:00:00".to_string(),
            is_warning: true,
            expired: true,
        };
        assert_eq!(tick(end, end), expected);
        assert_eq!(tick(end, end + Duration::seconds(5)), expected);
    }

    #[test]
    fn sub_second_remaining_is_floored() {
        let end = at(10, 30, 0);
        let now = end - Duration::milliseconds(1500);
        let t = tick(end, now);
        assert_eq!(t.display, "00:00:01");
        assert!(!t.expired);
    }

    #[test]
    fn formats_hours_minutes_seconds() {
        assert_eq!(format_hms(3661), "01:01:01");
        assert_eq!(format_hms(0), "00:00:00");
        assert_eq!(format_hms(100 * 3600 + 59), "100:00:59");
    }

    #[test]
    fn thirty_minute_timer_end_to_end() {
        let mut state = TimerState::new();
        state.begin(&TimerMode::FixedDuration { seconds: 30 * 60 }, at(10, 0, 0));

        let t = state.advance(at(10, 25, 1)).unwrap();
        assert_eq!(
            (t.display.as_str(), t.is_warning, t.expired),
            ("00:04:59", true, false)
        );
        assert_eq!(state.phase(), Phase::Warning);
    }

    #[test]
    fn expiry_stops_running_exactly_once() {
        let mut state = TimerState::new();
        state.begin(&TimerMode::FixedDuration { seconds: 600 }, at(10, 0, 0));
        assert_eq!(state.phase(), Phase::Running);

        let t = state.advance(at(10, 10, 0)).unwrap();
        assert!(t.expired);
        assert!(!state.is_running);
        assert_eq!(state.phase(), Phase::Expired);

        assert_eq!(state.advance(at(10, 10, 1)), None);
        assert_eq!(state.phase(), Phase::Expired);
    }

    #[test]
    fn stop_keeps_end_time() {
        let mut state = TimerState::new();
        let end = state.begin(&TimerMode::FixedDuration { seconds: 600 }, at(10, 0, 0));
        state.stop();

        assert_eq!(state.end_time, Some(end));
        assert_eq!(state.phase(), Phase::Stopped);
        assert_eq!(state.advance(at(10, 0, 1)), None);
    }

    #[test]
    fn restart_recomputes_end_time() {
        let mut state = TimerState::new();
        state.begin(&TimerMode::FixedDuration { seconds: 60 }, at(10, 0, 0));
        state.advance(at(10, 5, 0));
        assert_eq!(state.phase(), Phase::Expired);

        let end = state.begin(&TimerMode::FixedDuration { seconds: 60 }, at(10, 5, 0));
        assert_eq!(end, at(10, 6, 0));
        assert_eq!(state.phase(), Phase::Warning);
    }

    #[test]
    fn begin_inside_threshold_starts_in_warning() {
        let mut state = TimerState::new();
        state.begin(&TimerMode::FixedDuration { seconds: 60 }, at(10, 0, 0));
        assert!(state.is_warning);
        assert_eq!(state.phase(), Phase::Warning);

        state.begin(&TimerMode::FixedDuration { seconds: 301 }, at(10, 0, 0));
        assert!(!state.is_warning);
        assert_eq!(state.phase(), Phase::Running);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "unvalidated timer mode")]
    fn start_refuses_out_of_range_clock_target() {
        start(&TimerMode::CustomClockTarget { hour: 24, minute: 0 }, at(10, 0, 0));
    }

    #[test]
    fn reset_clears_and_is_idempotent() {
        let mut state = TimerState::new();
        state.begin(&TimerMode::FixedDuration { seconds: 60 }, at(10, 0, 0));
        state.advance(at(10, 0, 30));

        state = reset();
        assert_eq!(state.phase(), Phase::Idle);
        assert_eq!(state, TimerState::default());
        assert_eq!(reset(), state);
    }
}
