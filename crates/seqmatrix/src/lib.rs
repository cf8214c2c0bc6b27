#![forbid(unsafe_code)]

//! Sequence Matrix terminal application.
//!
//! Click (or number-key) every box once; the matrix then replays the click
//! order one box at a time and shows a completion panel until reset.

pub mod app;
pub mod cli;
pub mod layout;
pub mod logging;
pub mod view;

pub use app::{MatrixApp, Msg};
