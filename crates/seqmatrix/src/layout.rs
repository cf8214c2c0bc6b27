#![forbid(unsafe_code)]

//! Screen layout and mouse hit-testing.
//!
//! [`MatrixLayout::compute`] is the single source of geometry: the view draws
//! into the rectangles it returns and mouse clicks are resolved against the
//! same rectangles, so what is drawn is what is clickable.

use seqmatrix_core::MatrixConfig;
use seqmatrix_runtime::Rect;

const BOX_WIDTH: u16 = 9;
const BOX_HEIGHT: u16 = 5;
const COMPACT_BOX_HEIGHT: u16 = 3;
const GAP_X: u16 = 2;
const GAP_Y: u16 = 1;
/// Border plus inner padding around the grid.
const BOARD_PAD_X: u16 = 3;
const BOARD_PAD_Y: u16 = 2;
const HEADER_ROWS: u16 = 3;

pub const RESET_LABEL: &str = "[ Reset ]";
pub const PANEL_RESET_LABEL: &str = "[ Reset Matrix ]";
const PANEL_WIDTH: u16 = 44;
const PANEL_HEIGHT: u16 = 7;

/// What a mouse click landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Cell(usize),
    Reset,
}

/// Rectangles for every element on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixLayout {
    /// Badge, title and description rows.
    pub header: Rect,
    /// Bordered area holding the grid.
    pub board: Rect,
    /// One rectangle per cell, indexed by cell.
    pub cells: Vec<Rect>,
    /// Completion overlay, centred on the board.
    pub panel: Rect,
    pub panel_button: Rect,
    pub reset_button: Rect,
    pub progress: Rect,
}

impl MatrixLayout {
    /// Lay out `config.grid_size` cells inside `area`.
    ///
    /// Boxes shrink to a compact height when the full layout does not fit
    /// vertically; anything still too large is clipped by the frame.
    pub fn compute(area: Rect, config: &MatrixConfig) -> Self {
        let columns = config.columns.max(1) as u16;
        let rows = config.rows() as u16;

        let board_height = |box_height: u16| {
            rows * box_height + rows.saturating_sub(1) * GAP_Y + 2 * BOARD_PAD_Y
        };
        // header, blank, board, blank, reset, blank, progress
        let total = |box_height: u16| HEADER_ROWS + 1 + board_height(box_height) + 5;

        let box_height = if total(BOX_HEIGHT) <= area.height {
            BOX_HEIGHT
        } else {
            COMPACT_BOX_HEIGHT
        };
        let grid_width = columns * BOX_WIDTH + columns.saturating_sub(1) * GAP_X;
        let board_width = grid_width + 2 * BOARD_PAD_X;

        let top = area.y + area.height.saturating_sub(total(box_height)) / 2;
        let header = Rect::new(area.x, top, area.width, HEADER_ROWS);
        let board_y = header.bottom() + 1;
        let board_x = area.x + area.width.saturating_sub(board_width) / 2;
        let board = Rect::new(board_x, board_y, board_width, board_height(box_height));

        let cells = (0..config.grid_size)
            .map(|cell| {
                let col = (cell % config.columns.max(1)) as u16;
                let row = (cell / config.columns.max(1)) as u16;
                Rect::new(
                    board.x + BOARD_PAD_X + col * (BOX_WIDTH + GAP_X),
                    board.y + BOARD_PAD_Y + row * (box_height + GAP_Y),
                    BOX_WIDTH,
                    box_height,
                )
            })
            .collect();

        let panel = board.centered(PANEL_WIDTH.min(board.width), PANEL_HEIGHT);
        let panel_button = label_rect(panel, panel.bottom().saturating_sub(2), PANEL_RESET_LABEL);
        let reset_row = board.bottom() + 1;
        let reset_button = label_rect(
            Rect::new(area.x, reset_row, area.width, 1),
            reset_row,
            RESET_LABEL,
        );
        let progress = Rect::new(area.x, reset_row + 2, area.width, 1);

        Self {
            header,
            board,
            cells,
            panel,
            panel_button,
            reset_button,
            progress,
        }
    }

    /// Resolve a click at `(x, y)`.
    ///
    /// While the completion panel is shown it covers the board: only its
    /// button and the main reset button respond.
    pub fn hit(&self, x: u16, y: u16, panel_visible: bool) -> Option<Hit> {
        if self.reset_button.contains(x, y) {
            return Some(Hit::Reset);
        }
        if panel_visible {
            return self.panel_button.contains(x, y).then_some(Hit::Reset);
        }
        self.cells
            .iter()
            .position(|rect| rect.contains(x, y))
            .map(Hit::Cell)
    }
}

/// One-row rectangle exactly as wide as `label`, centred in `within`.
fn label_rect(within: Rect, y: u16, label: &str) -> Rect {
    let width = label.chars().count() as u16;
    let x = within.x + within.width.saturating_sub(width) / 2;
    Rect::new(x, y, width, 1)
}
