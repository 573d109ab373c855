//! Class Timer - A classroom countdown timer
//! 
//! This library provides the countdown engine (timer modes, end time
//! derivation, per-second ticks with a five minute warning), the shared
//! application state, an HTTP control panel and a terminal display.

pub mod config;
pub mod engine;
pub mod state;
pub mod display;
pub mod api;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use engine::{Clock, SystemClock, TimerMode, TimerState};
pub use state::AppState;
pub use api::create_router;
pub use utils::signals::shutdown_signal;
