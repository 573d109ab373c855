//! Display module
//!
//! Colors and the terminal renderer students look at.

pub mod palette;
pub mod terminal;

pub use palette::{ColorError, Palette, PaletteUpdate, Rgb};
pub use terminal::{display_task, wait_for_quit_key};
