#![forbid(unsafe_code)]

//! Presentation mapper.
//!
//! Derives what each cell should look like from a [`SequenceModel`]. Nothing
//! here mutates; hosts call [`Scene::derive`] after every update and render
//! the result.

use crate::sequence::{Mode, ModeKind, SequenceModel};

/// Visual category of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisualState {
    /// Not clicked yet.
    Untouched,
    /// Recorded, waiting for the replay cursor.
    CapturedWaiting,
    /// Just clicked while capturing, or already replayed.
    CapturedActiveOrDone,
}

/// Visual state of one cell plus its order label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellView {
    pub cell: usize,
    pub state: VisualState,
    /// 1-based click position; `None` when untouched.
    pub label: Option<usize>,
}

/// Compute the view of a single cell.
pub fn cell_view(model: &SequenceModel, cell: usize) -> CellView {
    let Some(position) = model.position_of(cell) else {
        return CellView {
            cell,
            state: VisualState::Untouched,
            label: None,
        };
    };

    let state = match model.mode() {
        Mode::Capturing => VisualState::CapturedActiveOrDone,
        Mode::Replaying { .. } | Mode::Complete => {
            if position < model.cursor() {
                VisualState::CapturedActiveOrDone
            } else {
                VisualState::CapturedWaiting
            }
        }
    };

    CellView {
        cell,
        state,
        label: Some(position + 1),
    }
}

/// "x / N" readout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub recorded: usize,
    pub total: usize,
}

/// Every output signal of the widget for one model state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scene {
    pub cells: Vec<CellView>,
    pub mode: ModeKind,
    /// True exactly when the replay is complete.
    pub show_completion: bool,
    pub progress: Progress,
    /// Reset has nothing to clear while the sequence is empty.
    pub reset_enabled: bool,
}

impl Scene {
    /// Derive the scene for `model`.
    pub fn derive(model: &SequenceModel) -> Self {
        let mode = model.mode().kind();
        Self {
            cells: (0..model.grid_size())
                .map(|cell| cell_view(model, cell))
                .collect(),
            mode,
            show_completion: mode == ModeKind::Complete,
            progress: Progress {
                recorded: model.len(),
                total: model.grid_size(),
            },
            reset_enabled: !model.is_empty(),
        }
    }

    /// View of `cell`, if it exists.
    pub fn cell(&self, cell: usize) -> Option<&CellView> {
        self.cells.get(cell)
    }

    /// Number of cells in `state`.
    pub fn count(&self, state: VisualState) -> usize {
        self.cells.iter().filter(|view| view.state == state).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn replaying(order: &[usize], ticks: usize) -> SequenceModel {
        let mut model = SequenceModel::new(order.len());
        for &cell in order {
            model.record_click(cell);
        }
        for _ in 0..ticks {
            model.advance();
        }
        model
    }

    #[test]
    fn untouched_cells_have_no_label() {
        let model = SequenceModel::new(9);
        let view = cell_view(&model, 5);
        assert_eq!(view.state, VisualState::Untouched);
        assert_eq!(view.label, None);
    }

    #[test]
    fn capturing_cells_are_active_with_labels() {
        let mut model = SequenceModel::new(9);
        model.record_click(8);
        model.record_click(2);
        assert_eq!(
            cell_view(&model, 2),
            CellView {
                cell: 2,
                state: VisualState::CapturedActiveOrDone,
                label: Some(2),
            }
        );
        assert_eq!(cell_view(&model, 8).label, Some(1));
    }

    #[test]
    fn replay_splits_on_cursor() {
        let model = replaying(&[4, 1, 0, 2, 3], 2);
        assert_eq!(cell_view(&model, 4).state, VisualState::CapturedActiveOrDone);
        assert_eq!(cell_view(&model, 1).state, VisualState::CapturedActiveOrDone);
        assert_eq!(cell_view(&model, 0).state, VisualState::CapturedWaiting);
        assert_eq!(cell_view(&model, 3).state, VisualState::CapturedWaiting);
        assert_eq!(cell_view(&model, 3).label, Some(5));
    }

    #[test]
    fn replay_start_shows_everything_waiting() {
        let model = replaying(&[0, 1, 2], 0);
        let scene = Scene::derive(&model);
        assert_eq!(scene.count(VisualState::CapturedWaiting), 3);
        assert!(!scene.show_completion);
    }

    #[test]
    fn complete_scene_shows_panel() {
        let model = replaying(&[2, 1, 0], 3);
        let scene = Scene::derive(&model);
        assert_eq!(scene.mode, ModeKind::Complete);
        assert!(scene.show_completion);
        assert_eq!(scene.count(VisualState::CapturedActiveOrDone), 3);
        assert_eq!(
            scene.progress,
            Progress {
                recorded: 3,
                total: 3
            }
        );
    }

    #[test]
    fn reset_is_disabled_only_when_empty() {
        let mut model = SequenceModel::new(9);
        assert!(!Scene::derive(&model).reset_enabled);
        model.record_click(0);
        let scene = Scene::derive(&model);
        assert!(scene.reset_enabled);
        assert_eq!(scene.progress.recorded, 1);
        assert_eq!(scene.cell(0).map(|v| v.label), Some(Some(1)));
        assert!(scene.cell(9).is_none());
    }
}
