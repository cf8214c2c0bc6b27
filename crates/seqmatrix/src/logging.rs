#![forbid(unsafe_code)]

//! Tracing subscriber setup.
//!
//! The UI owns the terminal, so log output only ever goes to a file. Without
//! `--log-file` no subscriber is installed and every event is discarded.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::cli::Opts;

/// Build a file-writing subscriber for `filter` directives.
pub fn file_subscriber(
    path: &Path,
    filter: &str,
) -> io::Result<impl tracing::Subscriber + Send + Sync + 'static> {
    let filter = EnvFilter::try_new(filter)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let file: File = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .finish())
}

/// Install the global subscriber described by `opts`.
///
/// Returns `Ok(false)` when logging is disabled.
pub fn init_logging(opts: &Opts) -> io::Result<bool> {
    let Some(path) = opts.log_file.as_deref() else {
        return Ok(false);
    };
    let subscriber = file_subscriber(path, &opts.log_filter)?;
    tracing::subscriber::set_global_default(subscriber).map_err(io::Error::other)?;
    tracing::info!(path = %path.display(), filter = %opts.log_filter, "logging started");
    Ok(true)
}
