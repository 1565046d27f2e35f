//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `reindexer` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization and configuration loading
//! - Interrupt handling and user-facing output
//!
//! All core functionality is implemented in the library crate.

use std::process::{self, ExitCode};

use anyhow::{Context, Result};
use clap::Parser;
use log::warn;

use reindexer::initialization::init_logger_with;
use reindexer::{run_reindex, wait_for_shutdown_signal, Config, Opt, RunOutcome};

/// Conventional exit status after SIGINT.
const INTERRUPTED_EXIT_CODE: u8 = 130;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load environment variables from .env file (if it exists)
    // Try loading from current directory first, then from the executable's directory
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let opt = Opt::parse();

    init_logger_with(opt.log_level.clone().into(), opt.log_format.clone())
        .context("Failed to initialize logger")?;

    let mut config = match Config::load(&opt.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("reindexer error: {}", e);
            process::exit(1);
        }
    };
    opt.apply_overrides(&mut config);

    // The run future is dropped when a signal wins, which releases the lock
    // and aborts the workers before the runtime shuts down
    let result = tokio::select! {
        result = run_reindex(config) => result,
        signal = wait_for_shutdown_signal() => {
            warn!("Received {}, stopping", signal);
            eprintln!("Interrupted by {}; in-flight batches were abandoned", signal);
            return Ok(ExitCode::from(INTERRUPTED_EXIT_CODE));
        }
    };

    match result {
        Ok(report) => {
            match report.outcome() {
                RunOutcome::Clean => println!("Reindex completed cleanly"),
                RunOutcome::CompletedWithErrors { failed_batches } => println!(
                    "Reindex completed with {} failed batch{} - see log for details",
                    failed_batches,
                    if failed_batches == 1 { "" } else { "es" }
                ),
            }
            println!("{}", report.summary_line());
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("reindexer error: {:#}", e);
            process::exit(1);
        }
    }
}
