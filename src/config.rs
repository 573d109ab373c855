//! Configuration and CLI argument handling

use clap::Parser;

use crate::{
    display::{Palette, Rgb},
    engine::TimerMode,
};

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "class-timer")]
#[command(about = "A classroom countdown timer with an HTTP control panel and a terminal display")]
#[command(version)]
pub struct Config {
    /// Port for the control panel
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address for the control panel
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Start a countdown right away, e.g. "30m", "1h15m" or "13:30"
    #[arg(short, long, value_name = "MODE")]
    pub start: Option<TimerMode>,

    /// Text color while more than five minutes remain
    #[arg(long, default_value = "#ffffff")]
    pub normal_color: Rgb,

    /// Text color for the last five minutes
    #[arg(long, default_value = "#ff0000")]
    pub warning_color: Rgb,

    /// Display background color
    #[arg(long, default_value = "#000000")]
    pub background_color: Rgb,

    /// Run the control panel without drawing the terminal display
    #[arg(long)]
    pub no_display: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level.
    ///
    /// Logs share the terminal with the display, so only warnings are shown
    /// while it is drawn unless verbose output was requested.
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.no_display {
            "info"
        } else {
            "warn"
        }
    }

    /// Display colors chosen on the command line
    pub fn palette(&self) -> Palette {
        Palette {
            normal: self.normal_color,
            warning: self.warning_color,
            background: self.background_color,
        }
    }
}
