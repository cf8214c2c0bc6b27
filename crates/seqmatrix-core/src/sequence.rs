#![forbid(unsafe_code)]

//! Sequence model: the ordered record of clicks and the widget mode.
//!
//! # Invariants
//!
//! 1. A cell index appears at most once in the sequence.
//! 2. `len() <= grid_size()` at all times.
//! 3. `Mode::Capturing` holds exactly while `len() < grid_size()`.
//! 4. The switch to [`Mode::Replaying`] happens inside the same call that
//!    appends the last cell; no observer sees a full sequence while the model
//!    is still capturing.
//! 5. The replay cursor only moves forward, one step per [`SequenceModel::advance`],
//!    and reaching `grid_size()` switches to [`Mode::Complete`] in that same step.
//!
//! Invalid input is never an error: it is reported as
//! [`ClickOutcome::Ignored`] and leaves the model untouched.

/// Widget mode.
///
/// The replay cursor lives inside `Replaying` so a cursor can never exist
/// while capturing, and `Complete` never carries a stale one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Accepting new clicks.
    #[default]
    Capturing,
    /// Replaying the recorded order; `cursor` cells have been replayed so far.
    Replaying { cursor: usize },
    /// Replay finished. Terminal until reset.
    Complete,
}

impl Mode {
    /// The mode without its payload.
    pub fn kind(&self) -> ModeKind {
        match self {
            Self::Capturing => ModeKind::Capturing,
            Self::Replaying { .. } => ModeKind::Replaying,
            Self::Complete => ModeKind::Complete,
        }
    }
}

/// Payload-free view of [`Mode`], used in scenes and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeKind {
    Capturing,
    Replaying,
    Complete,
}

impl ModeKind {
    /// Stable lowercase name for logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Capturing => "capturing",
            Self::Replaying => "replaying",
            Self::Complete => "complete",
        }
    }
}

/// Why a click was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The model is replaying or complete.
    NotCapturing,
    /// The cell is already in the sequence.
    AlreadyRecorded,
    /// The index is outside `[0, grid_size)`.
    OutOfRange,
}

/// Result of [`SequenceModel::record_click`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Nothing changed.
    Ignored(IgnoreReason),
    /// The cell was appended at `position` (0-based); capture continues.
    Recorded { position: usize },
    /// The cell filled the sequence and the model is now replaying.
    SequenceFull,
}

/// Result of [`SequenceModel::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Not replaying; nothing changed.
    Idle,
    /// The cursor moved and replay continues.
    Moved { cursor: usize },
    /// The cursor reached the end and the model is complete.
    Finished,
}

/// Ordered, duplicate-free record of clicked cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickSequence {
    order: Vec<usize>,
    /// `positions[cell]` is the cell's index into `order`, if recorded.
    positions: Vec<Option<usize>>,
}

impl ClickSequence {
    /// Create an empty sequence over `grid_size` cells.
    pub fn new(grid_size: usize) -> Self {
        Self {
            order: Vec::with_capacity(grid_size),
            positions: vec![None; grid_size],
        }
    }

    /// Cells in click order.
    pub fn as_slice(&self) -> &[usize] {
        &self.order
    }

    /// Number of recorded cells.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Whether `cell` has been recorded.
    pub fn contains(&self, cell: usize) -> bool {
        self.position_of(cell).is_some()
    }

    /// 0-based click position of `cell`.
    pub fn position_of(&self, cell: usize) -> Option<usize> {
        self.positions.get(cell).copied().flatten()
    }

    /// Cell clicked at `position`.
    pub fn cell_at(&self, position: usize) -> Option<usize> {
        self.order.get(position).copied()
    }

    fn push(&mut self, cell: usize) -> usize {
        let position = self.order.len();
        self.order.push(cell);
        self.positions[cell] = Some(position);
        position
    }

    fn clear(&mut self) {
        self.order.clear();
        self.positions.iter_mut().for_each(|slot| *slot = None);
    }
}

/// Sequence model: click record plus mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceModel {
    grid_size: usize,
    sequence: ClickSequence,
    mode: Mode,
}

impl SequenceModel {
    /// Create a fresh model over `grid_size` cells.
    pub fn new(grid_size: usize) -> Self {
        Self {
            grid_size,
            sequence: ClickSequence::new(grid_size),
            mode: Mode::Capturing,
        }
    }

    /// Number of cells in the grid.
    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    /// The click record.
    pub fn sequence(&self) -> &ClickSequence {
        &self.sequence
    }

    /// Current mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Number of recorded cells.
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// 0-based click position of `cell`.
    pub fn position_of(&self, cell: usize) -> Option<usize> {
        self.sequence.position_of(cell)
    }

    /// Replay cursor: 0 while capturing, `grid_size()` once complete.
    pub fn cursor(&self) -> usize {
        match self.mode {
            Mode::Capturing => 0,
            Mode::Replaying { cursor } => cursor,
            Mode::Complete => self.grid_size,
        }
    }

    /// Record a click on `cell`.
    pub fn record_click(&mut self, cell: usize) -> ClickOutcome {
        if self.mode != Mode::Capturing {
            return ClickOutcome::Ignored(IgnoreReason::NotCapturing);
        }
        if cell >= self.grid_size {
            return ClickOutcome::Ignored(IgnoreReason::OutOfRange);
        }
        if self.sequence.contains(cell) {
            return ClickOutcome::Ignored(IgnoreReason::AlreadyRecorded);
        }

        let position = self.sequence.push(cell);
        if self.sequence.len() == self.grid_size {
            self.mode = Mode::Replaying { cursor: 0 };
            #[cfg(feature = "tracing")]
            tracing::debug!(
                cell,
                grid_size = self.grid_size,
                "sequence full, replay starting"
            );
            ClickOutcome::SequenceFull
        } else {
            #[cfg(feature = "tracing")]
            tracing::trace!(cell, position, "click recorded");
            ClickOutcome::Recorded { position }
        }
    }

    /// Move the replay cursor one step.
    ///
    /// Reaching the end of the sequence completes the replay in the same call.
    pub fn advance(&mut self) -> Advance {
        let Mode::Replaying { cursor } = self.mode else {
            return Advance::Idle;
        };
        let next = (cursor + 1).min(self.grid_size);
        if next >= self.grid_size {
            self.mode = Mode::Complete;
            #[cfg(feature = "tracing")]
            tracing::debug!(grid_size = self.grid_size, "replay complete");
            Advance::Finished
        } else {
            self.mode = Mode::Replaying { cursor: next };
            Advance::Moved { cursor: next }
        }
    }

    /// Return to the initial state. Always permitted.
    pub fn reset(&mut self) {
        self.sequence.clear();
        self.mode = Mode::Capturing;
    }
}
