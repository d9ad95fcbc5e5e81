//! CLI command implementations for trace preparation
//!
//! Kept out of main.rs so the option handling can be unit tested.

use anyhow::{Context, Result};
use hairpin_trace::{
    prepare_hairpin, prepare_hairpin_split, select_traces, verify_trace, MalformedLinePolicy,
    PrepareConfig, ScheduleParams, TraceFormat,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;
use tracing::{info, warn};

/// Implementation of 'prepare_trace' - converts one trace file
pub fn cmd_prepare(format: &str, input: &Path, output_dir: &Path, config: &PrepareConfig) -> Result<()> {
    let Some(format) = TraceFormat::from_name(format) else {
        warn!("Unknown trace format {}, nothing prepared", format);
        return Ok(());
    };

    info!("Preparing {} ({:?}) into {}", input.display(), format, output_dir.display());

    let report = match format {
        TraceFormat::Hairpin => prepare_hairpin(input, output_dir, config),
        TraceFormat::HairpinSplit => {
            prepare_hairpin_split(input, output_dir, config, split_rng(config.seed))
        }
    }
    .with_context(|| format!("Failed to prepare trace {}", input.display()))?;

    info!(
        "Wrote {} output set(s), {} files, {} packets per link",
        report.outputs,
        report.files.len(),
        report.packets
    );
    Ok(())
}

/// Implementation of 'select_trace' - prints traces with many loss events
pub fn cmd_select(dir: &Path, config: &PrepareConfig) -> Result<()> {
    info!(
        "Scanning {} for traces with more than {} lossy samples",
        dir.display(),
        config.loss_select_threshold
    );

    let selected = select_traces(dir, config)
        .with_context(|| format!("Failed to scan trace directory {}", dir.display()))?;
    for name in &selected {
        println!("{name}");
    }

    info!("Selected {} trace(s)", selected.len());
    Ok(())
}

/// Implementation of 'verify_trace' - checks a prepared file and prints a summary
pub fn cmd_verify(input: &Path, config: &PrepareConfig) -> Result<()> {
    let summary = verify_trace(input, ScheduleParams::from(config))
        .with_context(|| format!("Invalid trace file {}", input.display()))?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

/// Helper function to merge the config file with command-line overrides
pub fn resolve_config(path: Option<&Path>, seed: Option<u64>, skip_malformed: bool) -> Result<PrepareConfig> {
    let mut config = match path {
        Some(path) => PrepareConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => PrepareConfig::default(),
    };

    if seed.is_some() {
        config.seed = seed;
    }
    if skip_malformed {
        config.malformed_lines = MalformedLinePolicy::Skip;
    }

    Ok(config)
}

fn split_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
