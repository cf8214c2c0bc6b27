#![forbid(unsafe_code)]

//! Frame buffer that `Model::view` draws into.
//!
//! A [`Frame`] is a fixed grid of styled [`Cell`]s. Drawing is clipped to the
//! frame bounds; nothing here touches the terminal. The runtime presents a
//! finished frame through [`TerminalSession`](crate::terminal_session::TerminalSession),
//! and the simulator keeps frames for assertions.

use crate::geometry::Rect;
pub use crossterm::style::Color;
use unicode_width::UnicodeWidthChar;

/// Text attributes for a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Style {
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub bold: bool,
    pub dim: bool,
}

impl Style {
    /// Unstyled text.
    pub const fn new() -> Self {
        Self {
            fg: None,
            bg: None,
            bold: false,
            dim: false,
        }
    }

    #[must_use]
    pub const fn fg(mut self, color: Color) -> Self {
        self.fg = Some(color);
        self
    }

    #[must_use]
    pub const fn bg(mut self, color: Color) -> Self {
        self.bg = Some(color);
        self
    }

    #[must_use]
    pub const fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    #[must_use]
    pub const fn dim(mut self) -> Self {
        self.dim = true;
        self
    }
}

/// One terminal cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub style: Style,
    /// Trailing half of a wide character; not printed on its own.
    pub continuation: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            style: Style::new(),
            continuation: false,
        }
    }
}

/// A width x height grid of cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl Frame {
    /// Create a blank frame.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::default(); usize::from(width) * usize::from(height)],
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// The whole frame as a rectangle.
    pub fn area(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    fn index(&self, x: u16, y: u16) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| usize::from(y) * usize::from(self.width) + usize::from(x))
    }

    /// Cell at `(x, y)`, if inside the frame.
    pub fn cell(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    /// Cells of row `y`.
    pub fn row(&self, y: u16) -> &[Cell] {
        match self.index(0, y) {
            Some(start) => &self.cells[start..start + usize::from(self.width)],
            None => &[],
        }
    }

    /// Overwrite one cell. Out-of-bounds writes are dropped.
    pub fn set(&mut self, x: u16, y: u16, ch: char, style: Style) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = Cell {
                ch,
                style,
                continuation: false,
            };
        }
    }

    /// Paint `rect` with `style`, clearing its text.
    pub fn fill(&mut self, rect: Rect, style: Style) {
        let rect = rect.intersection(&self.area());
        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                self.set(x, y, ' ', style);
            }
        }
    }

    /// Draw `text` starting at `(x, y)`, clipped at `max_x` and the frame edge.
    ///
    /// Returns the column after the last drawn character.
    pub fn print(&mut self, x: u16, y: u16, text: &str, style: Style, max_x: u16) -> u16 {
        let limit = max_x.min(self.width);
        let mut cx = x;
        for ch in text.chars() {
            let w = ch.width().unwrap_or(0) as u16;
            if w == 0 {
                continue;
            }
            if cx.saturating_add(w) > limit {
                break;
            }
            self.set(cx, y, ch, style);
            if w == 2
                && let Some(i) = self.index(cx + 1, y)
            {
                self.cells[i] = Cell {
                    ch: ' ',
                    style,
                    continuation: true,
                };
            }
            cx += w;
        }
        cx
    }

    /// Draw `text` centred horizontally within `rect` on row `y`.
    pub fn print_centered(&mut self, rect: Rect, y: u16, text: &str, style: Style) {
        let width: u16 = text
            .chars()
            .map(|c| c.width().unwrap_or(0) as u16)
            .sum();
        let x = rect.x + rect.width.saturating_sub(width) / 2;
        self.print(x, y, text, style, rect.right());
    }

    /// Draw a single-line border around `rect`, keeping its interior.
    pub fn border(&mut self, rect: Rect, style: Style) {
        if rect.width < 2 || rect.height < 2 {
            return;
        }
        let (right, bottom) = (rect.right() - 1, rect.bottom() - 1);
        for x in rect.x + 1..right {
            self.set(x, rect.y, '─', style);
            self.set(x, bottom, '─', style);
        }
        for y in rect.y + 1..bottom {
            self.set(rect.x, y, '│', style);
            self.set(right, y, '│', style);
        }
        self.set(rect.x, rect.y, '┌', style);
        self.set(right, rect.y, '┐', style);
        self.set(rect.x, bottom, '└', style);
        self.set(right, bottom, '┘', style);
    }

    /// Text of row `y` with trailing spaces trimmed.
    pub fn row_text(&self, y: u16) -> String {
        let text: String = self
            .row(y)
            .iter()
            .filter(|cell| !cell.continuation)
            .map(|cell| cell.ch)
            .collect();
        text.trim_end().to_string()
    }

    /// The whole frame as text, one line per row.
    pub fn to_text(&self) -> String {
        (0..self.height)
            .map(|y| self.row_text(y))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
