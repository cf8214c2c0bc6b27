#![forbid(unsafe_code)]

//! Terminal session lifecycle guard.
//!
//! [`TerminalSession`] owns raw mode, the alternate screen and mouse capture
//! for as long as it lives. Every mode it enables is disabled again on drop,
//! in reverse order, and a panic hook does the same best-effort cleanup so a
//! crash never leaves the shell in raw mode.
//!
//! # Cleanup Order
//!
//! 1. Disable mouse capture (if enabled)
//! 2. Show cursor (always)
//! 3. Leave alternate screen (if enabled)
//! 4. Exit raw mode (always)
//! 5. Flush stdout

use std::io::{self, Write};
use std::sync::OnceLock;
use std::time::Duration;

use crossterm::{cursor, event, queue, style, terminal};

use crate::event::Event;
use crate::frame::{Cell, Frame, Style};

/// Terminal modes to enable for a session.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Switch to the alternate screen buffer.
    pub alternate_screen: bool,
    /// Report mouse button events.
    pub mouse_capture: bool,
}

/// RAII guard over terminal state.
#[derive(Debug)]
pub struct TerminalSession {
    alternate_screen_enabled: bool,
    mouse_enabled: bool,
    /// Last presented frame, used to skip unchanged rows.
    last_frame: Option<Frame>,
}

impl TerminalSession {
    /// Enter raw mode and enable the requested modes.
    pub fn new(options: SessionOptions) -> io::Result<Self> {
        install_panic_hook();

        terminal::enable_raw_mode()?;
        tracing::info!("terminal raw mode enabled");

        let mut session = Self {
            alternate_screen_enabled: false,
            mouse_enabled: false,
            last_frame: None,
        };

        let mut stdout = io::stdout();

        if options.alternate_screen {
            crossterm::execute!(stdout, terminal::EnterAlternateScreen)?;
            session.alternate_screen_enabled = true;
            tracing::info!("alternate screen enabled");
        }

        if options.mouse_capture {
            crossterm::execute!(stdout, event::EnableMouseCapture)?;
            session.mouse_enabled = true;
            tracing::info!("mouse capture enabled");
        }

        crossterm::execute!(stdout, cursor::Hide)?;
        Ok(session)
    }

    /// Current terminal size (columns, rows).
    pub fn size(&self) -> io::Result<(u16, u16)> {
        terminal::size()
    }

    /// Wait up to `timeout` for input. Returns `Ok(true)` if an event is ready.
    pub fn poll_event(&self, timeout: Duration) -> io::Result<bool> {
        event::poll(timeout)
    }

    /// Read the next event.
    ///
    /// Returns `Ok(None)` for events the runtime does not model.
    pub fn read_event(&self) -> io::Result<Option<Event>> {
        Ok(Event::from_crossterm(event::read()?))
    }

    /// Write `frame` to the terminal, redrawing only rows that changed since
    /// the previous present.
    pub fn present(&mut self, frame: &Frame) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        let full = self
            .last_frame
            .as_ref()
            .is_none_or(|last| last.width() != frame.width() || last.height() != frame.height());
        if full {
            queue!(stdout, terminal::Clear(terminal::ClearType::All))?;
        }

        let mut rows_written = 0u32;
        for y in 0..frame.height() {
            let row = frame.row(y);
            if !full && self.last_frame.as_ref().is_some_and(|last| last.row(y) == row) {
                continue;
            }
            write_row(&mut stdout, y, row)?;
            rows_written += 1;
        }
        queue!(stdout, style::ResetColor, style::SetAttribute(style::Attribute::Reset))?;
        stdout.flush()?;

        tracing::trace!(rows_written, full, "frame presented");
        self.last_frame = Some(frame.clone());
        Ok(())
    }

    /// Forget the last frame so the next present redraws everything.
    pub fn invalidate(&mut self) {
        self.last_frame = None;
    }

    fn cleanup(&mut self) {
        let mut stdout = io::stdout();

        if self.mouse_enabled {
            let _ = crossterm::execute!(stdout, event::DisableMouseCapture);
            self.mouse_enabled = false;
        }

        let _ = crossterm::execute!(stdout, cursor::Show);

        if self.alternate_screen_enabled {
            let _ = crossterm::execute!(stdout, terminal::LeaveAlternateScreen);
            self.alternate_screen_enabled = false;
        }

        let _ = terminal::disable_raw_mode();
        let _ = stdout.flush();
        tracing::info!("terminal session restored");
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        self.cleanup();
    }
}

fn write_row(out: &mut impl Write, y: u16, row: &[Cell]) -> io::Result<()> {
    queue!(out, cursor::MoveTo(0, y))?;
    let mut current: Option<Style> = None;
    for cell in row.iter().filter(|cell| !cell.continuation) {
        if current != Some(cell.style) {
            apply_style(out, cell.style)?;
            current = Some(cell.style);
        }
        queue!(out, style::Print(cell.ch))?;
    }
    Ok(())
}

fn apply_style(out: &mut impl Write, s: Style) -> io::Result<()> {
    queue!(out, style::SetAttribute(style::Attribute::Reset), style::ResetColor)?;
    if let Some(fg) = s.fg {
        queue!(out, style::SetForegroundColor(fg))?;
    }
    if let Some(bg) = s.bg {
        queue!(out, style::SetBackgroundColor(bg))?;
    }
    if s.bold {
        queue!(out, style::SetAttribute(style::Attribute::Bold))?;
    }
    if s.dim {
        queue!(out, style::SetAttribute(style::Attribute::Dim))?;
    }
    Ok(())
}

fn install_panic_hook() {
    static HOOK: OnceLock<()> = OnceLock::new();
    HOOK.get_or_init(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            best_effort_cleanup();
            previous(info);
        }));
    });
}

fn best_effort_cleanup() {
    let mut stdout = io::stdout();

    let _ = crossterm::execute!(stdout, event::DisableMouseCapture);
    let _ = crossterm::execute!(stdout, cursor::Show);
    let _ = crossterm::execute!(stdout, terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = stdout.flush();
}
