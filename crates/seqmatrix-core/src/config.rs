#![forbid(unsafe_code)]

//! Matrix configuration.
//!
//! The grid size and replay cadence are fixed in the shipped widget
//! ([`GRID_SIZE`] cells, one tick every [`TICK_DELAY`]). [`MatrixConfig`]
//! carries them as values so hosts and tests can build smaller grids or a
//! faster replay without touching the state machine.

use std::fmt;
use std::time::Duration;

/// Number of cells in the shipped grid.
pub const GRID_SIZE: usize = 9;

/// Number of grid columns in the shipped layout.
pub const GRID_COLUMNS: usize = 3;

/// Delay between two replay ticks.
pub const TICK_DELAY: Duration = Duration::from_millis(600);

/// Largest grid the widget supports (one digit key per cell).
pub const MAX_GRID_SIZE: usize = 9;

/// Validated matrix configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatrixConfig {
    /// Number of cells (`N`).
    pub grid_size: usize,
    /// Number of columns used to lay out the cells.
    pub columns: usize,
    /// Delay between replay ticks (`D`).
    pub tick_delay: Duration,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            grid_size: GRID_SIZE,
            columns: GRID_COLUMNS,
            tick_delay: TICK_DELAY,
        }
    }
}

impl MatrixConfig {
    /// Override the tick delay.
    #[must_use]
    pub fn with_tick_delay(mut self, tick_delay: Duration) -> Self {
        self.tick_delay = tick_delay;
        self
    }

    /// Override the grid size.
    #[must_use]
    pub fn with_grid_size(mut self, grid_size: usize) -> Self {
        self.grid_size = grid_size;
        self
    }

    /// Override the column count.
    #[must_use]
    pub fn with_columns(mut self, columns: usize) -> Self {
        self.columns = columns;
        self
    }

    /// Number of rows needed to lay out every cell.
    pub fn rows(&self) -> usize {
        self.grid_size.div_ceil(self.columns.max(1))
    }

    /// Check the configuration for values the state machine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size == 0 {
            return Err(ConfigError::EmptyGrid);
        }
        if self.grid_size > MAX_GRID_SIZE {
            return Err(ConfigError::GridTooLarge {
                requested: self.grid_size,
                max: MAX_GRID_SIZE,
            });
        }
        if self.columns == 0 {
            return Err(ConfigError::ZeroColumns);
        }
        if self.tick_delay.is_zero() {
            return Err(ConfigError::ZeroTickDelay);
        }
        Ok(())
    }
}

/// Errors from [`MatrixConfig::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The grid has no cells.
    EmptyGrid,
    /// More cells were requested than the widget supports.
    GridTooLarge { requested: usize, max: usize },
    /// The layout has no columns.
    ZeroColumns,
    /// Replay ticks must be separated by a non-zero delay.
    ZeroTickDelay,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGrid => write!(f, "grid size must be at least 1"),
            Self::GridTooLarge { requested, max } => {
                write!(f, "grid size {requested} exceeds the maximum of {max}")
            }
            Self::ZeroColumns => write!(f, "column count must be at least 1"),
            Self::ZeroTickDelay => write!(f, "tick delay must be greater than zero"),
        }
    }
}

impl std::error::Error for ConfigError {}
