#![forbid(unsafe_code)]

//! Command-line argument parsing for the sequence matrix.
//!
//! Parses args manually to keep the binary lean. Supports environment
//! variable overrides via the `SEQMATRIX_*` prefix.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use seqmatrix_core::TICK_DELAY;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const HELP_TEXT: &str = "\
Sequence Matrix: click every box, then watch the order replay

USAGE:
    seqmatrix [OPTIONS]

OPTIONS:
    --tick-ms=N          Replay step in milliseconds (default: 600)
    --no-mouse           Disable mouse event capture
    --exit-after-ms=N    Quit on its own after N milliseconds
    --log-file=PATH      Write tracing output to PATH
    --help, -h           Show this help message
    --version, -V        Show version

KEYBINDINGS:
    1-9             Click the box with that number
    r               Reset the matrix
    q / Esc / Ctrl+C Quit

ENVIRONMENT VARIABLES:
    SEQMATRIX_TICK_MS         Override --tick-ms
    SEQMATRIX_EXIT_AFTER_MS   Override --exit-after-ms
    SEQMATRIX_LOG_FILE        Override --log-file
    SEQMATRIX_LOG             Log filter directives (default: info)";

const DEFAULT_LOG_FILTER: &str = "info";

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opts {
    /// Replay step in milliseconds.
    pub tick_ms: u64,
    /// Whether mouse events are enabled.
    pub mouse: bool,
    /// Auto-exit after this many milliseconds (0 = disabled).
    pub exit_after_ms: u64,
    /// Tracing output file; logging is off without one.
    pub log_file: Option<PathBuf>,
    /// `EnvFilter` directives.
    pub log_filter: String,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            tick_ms: TICK_DELAY.as_millis() as u64,
            mouse: true,
            exit_after_ms: 0,
            log_file: None,
            log_filter: DEFAULT_LOG_FILTER.into(),
        }
    }
}

/// What the command line asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Run(Opts),
    Help,
    Version,
}

/// A command line that cannot be run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliError {
    InvalidValue { flag: &'static str, value: String },
    UnknownArgument(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidValue { flag, value } => write!(f, "Invalid {flag} value: {value}"),
            Self::UnknownArgument(arg) => write!(f, "Unknown argument: {arg}"),
        }
    }
}

impl std::error::Error for CliError {}

impl Opts {
    /// Parse the process arguments and environment.
    ///
    /// Prints help or version and exits when asked; prints the error and
    /// exits with status 1 on a bad command line.
    pub fn parse() -> Self {
        let args: Vec<String> = env::args().skip(1).collect();
        match parse_args(&args, |key| env::var(key).ok()) {
            Ok(Command::Run(opts)) => opts,
            Ok(Command::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Ok(Command::Version) => {
                println!("seqmatrix {VERSION}");
                process::exit(0);
            }
            Err(e) => {
                eprintln!("{e}");
                eprintln!("Run with --help for usage information.");
                process::exit(1);
            }
        }
    }

    /// Replay step as a duration.
    pub fn tick_delay(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// Auto-exit deadline, if enabled.
    pub fn exit_after(&self) -> Option<Duration> {
        (self.exit_after_ms > 0).then(|| Duration::from_millis(self.exit_after_ms))
    }
}

/// Parse `args` (without the program name) against `env`.
///
/// Environment variables take precedence over defaults but are overridden by
/// explicit command-line flags. Unparseable environment values are ignored.
pub fn parse_args(
    args: &[String],
    env: impl Fn(&str) -> Option<String>,
) -> Result<Command, CliError> {
    let mut opts = Opts::default();

    if let Some(n) = env("SEQMATRIX_TICK_MS").and_then(|v| v.parse().ok()) {
        opts.tick_ms = n;
    }
    if let Some(n) = env("SEQMATRIX_EXIT_AFTER_MS").and_then(|v| v.parse().ok()) {
        opts.exit_after_ms = n;
    }
    if let Some(path) = env("SEQMATRIX_LOG_FILE").filter(|v| !v.is_empty()) {
        opts.log_file = Some(PathBuf::from(path));
    }
    if let Some(filter) = env("SEQMATRIX_LOG").filter(|v| !v.is_empty()) {
        opts.log_filter = filter;
    }

    for arg in args {
        match arg.as_str() {
            "--help" | "-h" => return Ok(Command::Help),
            "--version" | "-V" => return Ok(Command::Version),
            "--no-mouse" => opts.mouse = false,
            other => {
                if let Some(val) = other.strip_prefix("--tick-ms=") {
                    opts.tick_ms = parse_number("--tick-ms", val)?;
                } else if let Some(val) = other.strip_prefix("--exit-after-ms=") {
                    opts.exit_after_ms = parse_number("--exit-after-ms", val)?;
                } else if let Some(val) = other.strip_prefix("--log-file=") {
                    opts.log_file = Some(PathBuf::from(val));
                } else {
                    return Err(CliError::UnknownArgument(other.to_string()));
                }
            }
        }
    }

    Ok(Command::Run(opts))
}

fn parse_number(flag: &'static str, value: &str) -> Result<u64, CliError> {
    value.parse().map_err(|_| CliError::InvalidValue {
        flag,
        value: value.to_string(),
    })
}
