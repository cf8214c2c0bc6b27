#![forbid(unsafe_code)]

//! Core: click-sequence capture, timed playback, and cell presentation.
//!
//! # Key Components
//!
//! - [`SequenceModel`] - Ordered click record and the widget [`Mode`]
//! - [`PlaybackScheduler`] - One-shot replay timers with stale-fire rejection
//! - [`Scene`] - Pure per-cell presentation derived from the model
//! - [`SequenceMatrix`] - The three bundled behind click/tick/reset entry points
//!
//! This crate performs no I/O and owns no clock. Timers are described as
//! [`TimerEffect`] values and executed by the host runtime.

pub mod config;
pub mod mapper;
pub mod matrix;
pub mod playback;
pub mod sequence;

pub use config::{ConfigError, GRID_COLUMNS, GRID_SIZE, MAX_GRID_SIZE, MatrixConfig, TICK_DELAY};
pub use mapper::{CellView, Progress, Scene, VisualState, cell_view};
pub use matrix::SequenceMatrix;
pub use playback::{FireVerdict, PlaybackScheduler, TickToken, TimerEffect};
pub use sequence::{
    Advance, ClickOutcome, ClickSequence, IgnoreReason, Mode, ModeKind, SequenceModel,
};
