//! Candidate trace selection
//!
//! Scans a directory of raw traces and picks those with enough loss events
//! to be interesting for loss experiments.

use crate::config::PrepareConfig;
use crate::error::{Result, TraceError};
use crate::reader::count_lossy_lines;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

/// Access technologies whose traces are considered
pub const CANDIDATE_MARKERS: [&str; 3] = ["eth", "cell", "wifi"];

pub fn is_candidate_name(name: &str) -> bool {
    CANDIDATE_MARKERS.iter().any(|marker| name.contains(marker))
}

/// Names of candidate traces in `dir` with more lossy lines than the threshold
///
/// Files are visited in name order; subdirectories are ignored.
pub fn select_traces(dir: impl AsRef<Path>, config: &PrepareConfig) -> Result<Vec<String>> {
    let dir = dir.as_ref();
    let mut names = Vec::new();

    for entry in std::fs::read_dir(dir).map_err(|e| TraceError::io(dir, e))? {
        let entry = entry.map_err(|e| TraceError::io(dir, e))?;
        let file_type = entry.file_type().map_err(|e| TraceError::io(entry.path(), e))?;
        if !file_type.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if is_candidate_name(&name) {
            names.push(name);
        }
    }
    names.sort();

    let mut selected = Vec::new();
    for name in names {
        let path = dir.join(&name);
        let file = File::open(&path).map_err(|e| TraceError::io(&path, e))?;
        let lossy = count_lossy_lines(
            BufReader::new(file),
            &path,
            config.loss_select_threshold,
            config.malformed_lines,
        )?;

        debug!("{}: {} lossy lines", name, lossy);
        if lossy > config.loss_select_threshold {
            selected.push(name);
        }
    }

    Ok(selected)
}
