//! Timer modes and their labels

use std::{fmt, str::FromStr};

use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::countdown::ZERO_DURATION_FALLBACK_SECS;

/// Largest duration `chrono::Duration::seconds` accepts
const MAX_DURATION_SECS: i64 = i64::MAX / 1000;

/// Errors raised when a mode comes from outside the control panel's bounded inputs
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModeError {
    #[error("hour must be between 0 and 23, got {0}")]
    InvalidHour(u32),
    #[error("minute must be between 0 and 59, got {0}")]
    InvalidMinute(u32),
    #[error("seconds must be between 0 and 59, got {0}")]
    InvalidSecond(u32),
    #[error("unrecognized timer mode: {0:?}")]
    Unrecognized(String),
}

/// How a countdown derives its end time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimerMode {
    /// One of the built-in "time until" presets
    FixedClockTarget { hour: u32, minute: u32 },
    /// A time of day picked by the instructor
    CustomClockTarget { hour: u32, minute: u32 },
    /// One of the built-in duration presets
    FixedDuration { seconds: u64 },
    /// A duration entered by the instructor
    CustomDuration { hours: u32, minutes: u32, seconds: u32 },
}

impl TimerMode {
    /// Modes offered by the control panel out of the box
    pub fn presets() -> Vec<TimerMode> {
        vec![
            TimerMode::FixedClockTarget { hour: 8, minute: 30 },
            TimerMode::FixedClockTarget { hour: 9, minute: 0 },
            TimerMode::FixedClockTarget { hour: 10, minute: 50 },
            TimerMode::FixedClockTarget { hour: 13, minute: 30 },
            TimerMode::FixedClockTarget { hour: 15, minute: 20 },
            TimerMode::FixedDuration { seconds: 20 * 60 },
            TimerMode::FixedDuration { seconds: 30 * 60 },
            TimerMode::FixedDuration { seconds: 45 * 60 },
        ]
    }

    /// Check the fields against the ranges the control panel allows
    pub fn validate(&self) -> Result<(), ModeError> {
        match *self {
            TimerMode::FixedClockTarget { hour, minute }
            | TimerMode::CustomClockTarget { hour, minute } => {
                check_range(hour, 23, ModeError::InvalidHour)?;
                check_range(minute, 59, ModeError::InvalidMinute)
            }
            TimerMode::FixedDuration { .. } => Ok(()),
            TimerMode::CustomDuration { hours, minutes, seconds } => {
                check_range(hours, 23, ModeError::InvalidHour)?;
                check_range(minutes, 59, ModeError::InvalidMinute)?;
                check_range(seconds, 59, ModeError::InvalidSecond)
            }
        }
    }

    /// Target time of day for clock-target modes
    pub fn clock_target(&self) -> Option<(u32, u32)> {
        match *self {
            TimerMode::FixedClockTarget { hour, minute }
            | TimerMode::CustomClockTarget { hour, minute } => Some((hour, minute)),
            _ => None,
        }
    }

    /// Effective countdown length for duration modes.
    ///
    /// A zero duration is replaced by a one minute countdown.
    pub fn duration(&self) -> Option<Duration> {
        let seconds = match *self {
            TimerMode::FixedDuration { seconds } => seconds,
            TimerMode::CustomDuration { hours, minutes, seconds } => {
                u64::from(hours) * 3600 + u64::from(minutes) * 60 + u64::from(seconds)
            }
            _ => return None,
        };

        let seconds = if seconds == 0 {
            ZERO_DURATION_FALLBACK_SECS
        } else {
            i64::try_from(seconds)
                .unwrap_or(i64::MAX)
                .min(MAX_DURATION_SECS)
        };
        Some(Duration::seconds(seconds))
    }

    /// Label shown next to the countdown
    pub fn label(&self) -> String {
        match *self {
            TimerMode::FixedClockTarget { hour, minute } => {
                let (display_hour, suffix) = match hour {
                    0 => (12, "AM"),
                    1..=11 => (hour, "AM"),
                    12 => (12, "PM"),
                    _ => (hour - 12, "PM"),
                };
                format!("Until {}:{:02} {}", display_hour, minute, suffix)
            }
            TimerMode::CustomClockTarget { hour, minute } => {
                format!("Until {:02}:{:02}", hour, minute)
            }
            TimerMode::FixedDuration { seconds } => match self.duration() {
                Some(d) if seconds % 60 == 0 => {
                    format!("{} Minute Timer", d.num_minutes())
                }
                _ => format!("{} Second Timer", seconds.max(1)),
            },
            TimerMode::CustomDuration { hours, minutes, seconds } => {
                let parts: Vec<String> = [(hours, "hour"), (minutes, "minute"), (seconds, "second")]
                    .into_iter()
                    .filter(|(value, _)| *value > 0)
                    .map(|(value, unit)| plural(value, unit))
                    .collect();

                if parts.is_empty() {
                    "1 Minute Timer".to_string()
                } else {
                    format!("{} Timer", parts.join(" "))
                }
            }
        }
    }
}

impl fmt::Display for TimerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Parses `HH:MM` as a custom clock target and `[Nh][Nm][Ns]` as a custom duration
impl FromStr for TimerMode {
    type Err = ModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim().to_ascii_lowercase();
        let unrecognized = || ModeError::Unrecognized(s.to_string());

        if let Some((hour, minute)) = input.split_once(':') {
            let hour: u32 = hour.parse().map_err(|_| unrecognized())?;
            let minute: u32 = minute.parse().map_err(|_| unrecognized())?;
            let mode = TimerMode::CustomClockTarget { hour, minute };
            mode.validate()?;
            return Ok(mode);
        }

        let (mut hours, mut minutes, mut seconds) = (0u32, 0u32, 0u32);
        let mut digits = String::new();
        for c in input.chars() {
            if c.is_ascii_digit() {
                digits.push(c);
                continue;
            }
            let value: u32 = digits.parse().map_err(|_| unrecognized())?;
            digits.clear();
            match c {
                'h' => hours = hours.saturating_add(value),
                'm' => minutes = minutes.saturating_add(value),
                's' => seconds = seconds.saturating_add(value),
                _ => return Err(unrecognized()),
            }
        }
        if !digits.is_empty() || input.is_empty() {
            return Err(unrecognized());
        }

        // Normalize overflowing units, e.g. 90m
        minutes = minutes.saturating_add(seconds / 60);
        seconds %= 60;
        hours = hours.saturating_add(minutes / 60);
        minutes %= 60;

        let mode = TimerMode::CustomDuration { hours, minutes, seconds };
        mode.validate()?;
        Ok(mode)
    }
}

fn check_range(value: u32, max: u32, err: fn(u32) -> ModeError) -> Result<(), ModeError> {
    if value > max {
        Err(err(value))
    } else {
        Ok(())
    }
}

fn plural(value: u32, unit: &str) -> String {
    if value == 1 {
        format!("{} {}", value, unit)
    } else {
        format!("{} {}s", value, unit)
    }
}
