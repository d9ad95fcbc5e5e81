//! Measurement trace reader
//!
//! A trace line holds three space separated fields, `bandwidth rtt loss_rate`,
//! each optionally carrying a unit suffix. Lines with a negative loss rate mark
//! missing measurements and are dropped as a whole.

use crate::config::MalformedLinePolicy;
use crate::error::{Result, TraceError};
use crate::units::parse_unit_value;
use crate::{Trace, TraceSample};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, warn};

const BANDWIDTH_FIELD: usize = 0;
const RTT_FIELD: usize = 1;
const LOSS_FIELD: usize = 2;

#[derive(Clone, Copy, Debug)]
pub struct ReadOptions {
    /// Parse the rtt column; split mode leaves it untouched
    pub collect_rtt: bool,
    pub malformed_lines: MalformedLinePolicy,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            collect_rtt: true,
            malformed_lines: MalformedLinePolicy::FailFast,
        }
    }
}

/// Read a whole trace file
pub fn read_trace(path: impl AsRef<Path>, options: ReadOptions) -> Result<Trace> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| TraceError::io(path, e))?;
    let trace = parse_trace(BufReader::new(file), path, options)?;
    debug!("Read {} samples from {}", trace.len(), path.display());
    Ok(trace)
}

/// Parse trace lines from any buffered source; `source` is only used in errors
pub fn parse_trace<R: BufRead>(reader: R, source: &Path, options: ReadOptions) -> Result<Trace> {
    let mut trace = Trace::default();

    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let line = line.map_err(|e| TraceError::io(source, e))?;

        match parse_line(&line, options.collect_rtt) {
            Ok(Some(sample)) => trace.push(sample),
            Ok(None) => {}
            Err(reason) => handle_malformed(source, line_no, reason, options.malformed_lines)?,
        }
    }

    Ok(trace)
}

/// Apply the malformed-line policy: an error under fail-fast, a warning under skip
fn handle_malformed(
    source: &Path,
    line_no: usize,
    reason: String,
    policy: MalformedLinePolicy,
) -> Result<()> {
    match policy {
        MalformedLinePolicy::FailFast => Err(TraceError::malformed(source, line_no, reason)),
        MalformedLinePolicy::Skip => {
            warn!("{}:{}: skipping malformed line: {}", source.display(), line_no, reason);
            Ok(())
        }
    }
}

/// Parse one line; `Ok(None)` means the sample is a dropped negative-loss entry
fn parse_line(line: &str, collect_rtt: bool) -> std::result::Result<Option<TraceSample>, String> {
    let fields: Vec<&str> = line.split(' ').collect();
    if fields.len() <= LOSS_FIELD {
        return Err(format!("expected 3 fields, found {}", fields.len()));
    }

    let loss_rate = parse_field(&fields, LOSS_FIELD, "loss_rate")?;
    if loss_rate < 0.0 {
        return Ok(None);
    }

    let bandwidth = parse_field(&fields, BANDWIDTH_FIELD, "bandwidth")?;
    let rtt = if collect_rtt {
        Some(parse_field(&fields, RTT_FIELD, "rtt")?)
    } else {
        None
    };

    Ok(Some(TraceSample {
        bandwidth,
        rtt,
        loss_rate,
    }))
}

fn parse_field(fields: &[&str], index: usize, name: &str) -> std::result::Result<f64, String> {
    parse_unit_value(fields[index]).map_err(|e| format!("{name}: {e}"))
}

/// Count lines with a positive loss rate, stopping once `threshold` is exceeded
///
/// Only the loss column is inspected. The returned count is at most
/// `threshold + 1`.
pub fn count_lossy_lines<R: BufRead>(
    reader: R,
    source: &Path,
    threshold: usize,
    policy: MalformedLinePolicy,
) -> Result<usize> {
    let mut lossy = 0;

    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| TraceError::io(source, e))?;
        let fields: Vec<&str> = line.split(' ').collect();

        let loss = if fields.len() <= LOSS_FIELD {
            Err(format!("expected 3 fields, found {}", fields.len()))
        } else {
            parse_field(&fields, LOSS_FIELD, "loss_rate")
        };

        match loss {
            Ok(value) if value > 0.0 => {
                lossy += 1;
                if lossy > threshold {
                    break;
                }
            }
            Ok(_) => {}
            Err(reason) => handle_malformed(source, index + 1, reason, policy)?,
        }
    }

    Ok(lossy)
}
