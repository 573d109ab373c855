//! State management module
//! 
//! This module contains the shared application state and the display
//! snapshot it publishes.

pub mod app_state;
pub mod display_state;

// Re-export main types
pub use app_state::{AppState, ControlEvent};
pub use display_state::{Countdown, DisplayState, EXPIRED_LABEL, IDLE_LABEL};
