//! Emulator trace preparation CLI tool
//!
//! Converts bandwidth/RTT/loss measurement traces into the delivery schedules
//! and timeseries a trace-driven link emulator replays, and selects or checks
//! trace files.

mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{cmd_prepare, cmd_select, cmd_verify, resolve_config};
use std::path::{Path, PathBuf};
use tracing::Level;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Operation to run (prepare_trace, select_trace, verify_trace)
    #[arg(long, default_value = "prepare_trace")]
    operation: String,

    /// Input trace format for prepare_trace (hairpin, hairpin_split)
    #[arg(long, default_value = "hairpin")]
    format: String,

    /// Trace file, or trace directory for select_trace
    // String rather than PathBuf: clap's path parser rejects the empty default
    #[arg(long = "input_file", alias = "input-file", default_value = "")]
    input_file: String,

    /// Directory the prepared files are written to
    #[arg(long = "output_dir", alias = "output-dir", default_value = "./")]
    output_dir: PathBuf,

    /// JSON file overriding conversion parameters
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed for loss thinning in split mode
    #[arg(long)]
    seed: Option<u64>,

    /// Skip malformed trace lines instead of aborting
    #[arg(long = "skip_malformed", alias = "skip-malformed")]
    skip_malformed: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; stdout is left to command output
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = resolve_config(cli.config.as_deref(), cli.seed, cli.skip_malformed)?;

    let input_file = Path::new(&cli.input_file);

    match cli.operation.as_str() {
        "prepare_trace" => {
            cmd_prepare(&cli.format, input_file, &cli.output_dir, &config)?;
        }
        "select_trace" => {
            cmd_select(input_file, &config)?;
        }
        "verify_trace" => {
            cmd_verify(input_file, &config)?;
        }
        _ => {
            println!("Not supported format");
        }
    }

    Ok(())
}
