//! Countdown engine
//!
//! Pure computations mapping a timer mode and the current wall-clock time to
//! an end time and per-second display output. Nothing in here reads the
//! clock directly; callers pass `now` in, usually from a [`Clock`].

pub mod clock;
pub mod countdown;
pub mod mode;

pub use clock::{Clock, ManualClock, SystemClock};
pub use countdown::{
    format_hms, reset, start, tick, Phase, Tick, TimerState, EXPIRED_DISPLAY,
    WARNING_THRESHOLD_SECS, ZERO_DURATION_FALLBACK_SECS,
};
pub use mode::{ModeError, TimerMode};
