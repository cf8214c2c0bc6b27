#![forbid(unsafe_code)]

//! Frame rendering for a [`Scene`].

use seqmatrix_core::{CellView, ModeKind, Scene, VisualState};
use seqmatrix_runtime::{Color, Frame, Rect, Style};

use crate::layout::{MatrixLayout, PANEL_RESET_LABEL, RESET_LABEL};

pub const BADGE: &str = "INTERACTIVE MATRIX";
pub const TITLE: &str = "Color Sequence Matrix";
pub const DESCRIPTION: &str =
    "Click every box in any order, then watch the sequence replay in orange.";
pub const COMPLETE_TITLE: &str = "Sequence Complete";
pub const COMPLETE_BODY: &str = "All boxes replayed in order.";

const GREEN: Color = Color::Rgb {
    r: 134,
    g: 239,
    b: 172,
};
const ORANGE: Color = Color::Rgb {
    r: 251,
    g: 146,
    b: 60,
};
const INK: Color = Color::Rgb {
    r: 55,
    g: 65,
    b: 81,
};
const ACCENT: Color = Color::Rgb {
    r: 99,
    g: 102,
    b: 241,
};

const BADGE_STYLE: Style = Style::new().fg(ACCENT).bold();
const TITLE_STYLE: Style = Style::new().bold();
const MUTED: Style = Style::new().dim();
const UNTOUCHED_BORDER: Style = Style::new().dim();
const LABEL_STYLE: Style = Style::new().fg(INK).bold();
const PANEL_STYLE: Style = Style::new().fg(INK).bg(Color::White);

/// Fill colour for a cell, or `None` for an untouched one.
pub fn cell_color(view: &CellView, mode: ModeKind) -> Option<Color> {
    match view.state {
        VisualState::Untouched => None,
        VisualState::CapturedWaiting => Some(GREEN),
        VisualState::CapturedActiveOrDone => match mode {
            ModeKind::Capturing => Some(GREEN),
            ModeKind::Replaying | ModeKind::Complete => Some(ORANGE),
        },
    }
}

/// Draw the whole screen.
pub fn render(scene: &Scene, layout: &MatrixLayout, frame: &mut Frame) {
    render_header(layout.header, frame);

    frame.border(layout.board, MUTED);
    for (view, rect) in scene.cells.iter().zip(&layout.cells) {
        render_cell(view, scene.mode, *rect, frame);
    }

    if scene.show_completion {
        render_panel(layout, frame);
    }

    let reset_style = if scene.reset_enabled {
        Style::new().bold()
    } else {
        MUTED
    };
    frame.print(
        layout.reset_button.x,
        layout.reset_button.y,
        RESET_LABEL,
        reset_style,
        layout.reset_button.right(),
    );

    let progress = format!(
        "Boxes clicked: {} / {}",
        scene.progress.recorded, scene.progress.total
    );
    frame.print_centered(layout.progress, layout.progress.y, &progress, MUTED);
}

fn render_header(area: Rect, frame: &mut Frame) {
    frame.print_centered(area, area.y, BADGE, BADGE_STYLE);
    frame.print_centered(area, area.y + 1, TITLE, TITLE_STYLE);
    frame.print_centered(area, area.y + 2, DESCRIPTION, MUTED);
}

fn render_cell(view: &CellView, mode: ModeKind, rect: Rect, frame: &mut Frame) {
    let Some(color) = cell_color(view, mode) else {
        frame.border(rect, UNTOUCHED_BORDER);
        return;
    };
    let style = Style::new().bg(color);
    frame.fill(rect, style);
    if let Some(label) = view.label {
        let mid = rect.y + rect.height / 2;
        frame.print_centered(rect, mid, &label.to_string(), LABEL_STYLE.bg(color));
    }
}

fn render_panel(layout: &MatrixLayout, frame: &mut Frame) {
    let panel = layout.panel;
    frame.fill(panel, PANEL_STYLE);
    frame.border(panel, PANEL_STYLE);
    let inner = panel.inset(1);
    frame.print_centered(inner, inner.y, COMPLETE_TITLE, PANEL_STYLE.bold());
    frame.print_centered(inner, inner.y + 2, COMPLETE_BODY, PANEL_STYLE);
    frame.print(
        layout.panel_button.x,
        layout.panel_button.y,
        PANEL_RESET_LABEL,
        Style::new().fg(Color::White).bg(ORANGE).bold(),
        layout.panel_button.right(),
    );
}
