#![forbid(unsafe_code)]

//! Sequence Matrix binary entry point.

use seqmatrix::app::MatrixApp;
use seqmatrix::{cli, logging};
use seqmatrix_core::MatrixConfig;
use seqmatrix_runtime::{Program, ProgramConfig};

fn main() {
    let opts = cli::Opts::parse();

    if let Err(e) = logging::init_logging(&opts) {
        eprintln!("Failed to initialize logging: {e}");
        std::process::exit(1);
    }

    let matrix_config = MatrixConfig::default().with_tick_delay(opts.tick_delay());
    if let Err(e) = matrix_config.validate() {
        eprintln!("Invalid configuration: {e}");
        std::process::exit(1);
    }
    tracing::info!(
        grid_size = matrix_config.grid_size,
        tick_ms = opts.tick_ms,
        mouse = opts.mouse,
        "starting"
    );

    let config = ProgramConfig {
        mouse: opts.mouse,
        exit_after: opts.exit_after(),
        ..ProgramConfig::default()
    };
    match Program::with_config(MatrixApp::new(matrix_config), config) {
        Ok(mut program) => {
            if let Err(e) = program.run() {
                eprintln!("Runtime error: {e}");
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("Failed to initialize: {e}");
            std::process::exit(1);
        }
    }
}
