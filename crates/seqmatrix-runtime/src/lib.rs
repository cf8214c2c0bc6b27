#![forbid(unsafe_code)]

//! Sequence Matrix Runtime
//!
//! This crate provides a small Bubbletea/Elm-style runtime: a [`Model`]
//! receives messages, returns [`Cmd`]s for side effects, and draws into a
//! [`Frame`] on demand.
//!
//! # Key Components
//!
//! - [`Program`] - Runs a model against the real terminal
//! - [`ProgramSimulator`] - Runs a model on a virtual clock for tests
//! - [`TimerQueue`] - One-shot timers serviced by the event loop itself
//! - [`TerminalSession`] - RAII guard over raw mode, alt screen and mouse
//! - [`Frame`] - Clipped, styled cell buffer that views draw into
//!
//! Everything runs on one thread. Timers are deadlines the loop waits on,
//! not threads, so cancelling one is a synchronous removal.

pub mod event;
pub mod frame;
pub mod geometry;
pub mod program;
pub mod simulator;
pub mod terminal_session;
pub mod timer;

pub use event::{Event, KeyCode, KeyEvent, Modifiers, MouseButton, MouseEvent, MouseEventKind};
pub use frame::{Cell, Color, Frame, Style};
pub use geometry::Rect;
pub use program::{Cmd, Model, Program, ProgramConfig};
pub use simulator::{CmdRecord, ProgramSimulator};
pub use terminal_session::{SessionOptions, TerminalSession};
pub use timer::{TimerId, TimerQueue};
