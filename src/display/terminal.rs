//! Terminal rendering of the countdown

use std::io::{self, Write};

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    style::{Attribute, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::state::DisplayState;

const GLYPH_HEIGHT: usize = 5;

/// Fallback size when the terminal cannot be queried
const DEFAULT_SIZE: (u16, u16) = (80, 24);

fn glyph(c: char) -> [&'static str; GLYPH_HEIGHT] {
    match c {
        '0' => ["███", "█ █", "█ █", "█ █", "███"],
        '1' => ["  █", "  █", "  █", "  █", "  █"],
        '2' => ["███", "  █", "███", "█  ", "███"],
        '3' => ["███", "  █", "███", "  █", "███"],
        '4' => ["█ █", "█ █", "███", "  █", "  █"],
        '5' => ["███", "█  ", "███", "  █", "███"],
        '6' => ["███", "█  ", "███", "█ █", "███"],
        '7' => ["███", "  █", "  █", "  █", "  █"],
        '8' => ["███", "█ █", "███", "█ █", "███"],
        '9' => ["███", "█ █", "███", "  █", "███"],
        ':' => [" ", "█", " ", "█", " "],
        _ => ["   ", "   ", "   ", "   ", "   "],
    }
}

/// Render `text` as rows of block glyphs
pub fn banner(text: &str) -> Vec<String> {
    (0..GLYPH_HEIGHT)
        .map(|row| {
            text.chars()
                .map(|c| glyph(c)[row])
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

fn width(s: &str) -> u16 {
    u16::try_from(s.chars().count()).unwrap_or(u16::MAX)
}

fn centered(cols: u16, s: &str) -> u16 {
    cols.saturating_sub(width(s)) / 2
}

/// Draw one frame into `out` for a terminal of `size` (columns, rows)
pub fn draw<W: Write>(out: &mut W, frame: &DisplayState, size: (u16, u16)) -> io::Result<()> {
    let (cols, rows) = size;
    let palette = frame.palette;

    queue!(
        out,
        SetBackgroundColor(palette.background.into()),
        Clear(ClearType::All)
    )?;

    if frame.visible {
        let rows_text = banner(&frame.text);
        let big = rows_text.first().is_some_and(|row| width(row) <= cols)
            && usize::from(rows) > GLYPH_HEIGHT + 2;
        let lines = if big { rows_text } else { vec![frame.text.clone()] };

        let height = u16::try_from(lines.len()).unwrap_or(1);
        let top = rows.saturating_sub(height + 2) / 2;

        queue!(
            out,
            SetForegroundColor(palette.text_color(frame.is_warning).into()),
            SetAttribute(Attribute::Bold)
        )?;
        for (i, line) in lines.iter().enumerate() {
            let y = top + u16::try_from(i).unwrap_or(0);
            queue!(out, MoveTo(centered(cols, line), y), Print(line))?;
        }
        queue!(
            out,
            SetAttribute(Attribute::NormalIntensity),
            MoveTo(centered(cols, &frame.label), top + height + 1),
            Print(&frame.label)
        )?;
    }

    queue!(out, ResetColor)?;
    out.flush()
}

/// Raw mode and alternate screen for the lifetime of the display.
///
/// Raw mode keeps typed keys from echoing over the countdown; Ctrl-C then
/// arrives as a key event and is handled by [`wait_for_quit_key`].
struct ScreenGuard;

impl ScreenGuard {
    fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen, Hide) {
            let _ = terminal::disable_raw_mode();
            return Err(e);
        }
        Ok(Self)
    }
}

impl Drop for ScreenGuard {
    fn drop(&mut self) {
        if let Err(e) = execute!(io::stdout(), ResetColor, Show, LeaveAlternateScreen) {
            warn!("Failed to restore terminal: {}", e);
        }
        if let Err(e) = terminal::disable_raw_mode() {
            warn!("Failed to leave raw mode: {}", e);
        }
    }
}

/// Keys that close the display: `q`, Esc and Ctrl-C
pub fn is_quit_key(key: &KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    match key.code {
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => true,
        _ => false,
    }
}

/// Resolve once a quit key is pressed in the display's terminal.
///
/// Other keys are swallowed. Never resolves if terminal input is unavailable.
pub async fn wait_for_quit_key() {
    let mut events = EventStream::new();

    while let Some(event) = events.next().await {
        match event {
            Ok(Event::Key(key)) if is_quit_key(&key) => {
                info!("Quit key pressed");
                return;
            }
            Ok(_) => {}
            Err(e) => {
                warn!("Terminal input unavailable: {}", e);
                break;
            }
        }
    }

    std::future::pending::<()>().await
}

/// Redraw the terminal every time the published display changes
pub async fn display_task(mut display_rx: watch::Receiver<DisplayState>) {
    info!("Starting terminal display");

    let _guard = match ScreenGuard::enter() {
        Ok(guard) => guard,
        Err(e) => {
            warn!("Terminal display unavailable: {}", e);
            return;
        }
    };

    let mut stdout = io::stdout();
    loop {
        let frame = display_rx.borrow_and_update().clone();
        let size = terminal::size().unwrap_or(DEFAULT_SIZE);
        if let Err(e) = draw(&mut stdout, &frame, size) {
            warn!("Failed to draw display: {}", e);
        }

        if display_rx.changed().await.is_err() {
            debug!("Display channel closed");
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{Palette, Rgb};
    use crate::engine::Phase;

    fn frame(text: &str, is_warning: bool, visible: bool) -> DisplayState {
        DisplayState {
            text: text.to_string(),
            is_warning,
            expired: false,
            running: true,
            visible,
            label: "30 Minute Timer".to_string(),
            phase: if is_warning { Phase::Warning } else { Phase::Running },
            end_time: None,
            palette: Palette::default(),
        }
    }

    fn render(frame: &DisplayState, size: (u16, u16)) -> String {
        let mut out = Vec::new();
        draw(&mut out, frame, size).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn quit_keys() {
        let press = |code, modifiers| KeyEvent::new(code, modifiers);

        assert!(is_quit_key(&press(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(is_quit_key(&press(KeyCode::Char('q'), KeyModifiers::NONE)));
        assert!(is_quit_key(&press(KeyCode::Esc, KeyModifiers::NONE)));

        assert!(!is_quit_key(&press(KeyCode::Char('c'), KeyModifiers::NONE)));
        assert!(!is_quit_key(&press(KeyCode::Char('x'), KeyModifiers::NONE)));

        let mut release = press(KeyCode::Char('q'), KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        assert!(!is_quit_key(&release));
    }

    #[test]
    fn banner_builds_block_rows() {
        let rows = banner("1:0");
        assert_eq!(rows.len(), GLYPH_HEIGHT);
        assert_eq!(rows[0], "  █   ███");
        assert_eq!(rows[1], "  █ █ █ █");
    }

    #[test]
    fn colors_follow_warning_flag() {
        let normal = render(&frame("00:10:00", false, true), (120, 40));
        assert!(normal.contains("38;2;255;255;255"));
        assert!(normal.contains("30 Minute Timer"));

        let warning = render(&frame("00:04:59", true, true), (120, 40));
        assert!(warning.contains("38;2;255;0;0"));
    }

    #[test]
    fn narrow_terminal_falls_back_to_plain_text() {
        let output = render(&frame("00:04:59", false, true), (20, 10));
        assert!(output.contains("00:04:59"));
        assert!(!output.contains('█'));
    }

    #[test]
    fn hidden_display_only_paints_background() {
        let mut hidden = frame("00:10:00", false, false);
        hidden.palette.background = Rgb::new(0, 0, 64);
        let output = render(&hidden, (120, 40));
        assert!(output.contains("48;2;0;0;64"));
        assert!(!output.contains("30 Minute Timer"));
        assert!(!output.contains('█'));
    }
}
