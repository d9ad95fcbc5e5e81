//! Prepared trace verification
//!
//! Loads an emitted file with the same rules the emulator applies when it
//! reads traces, so a bad file is caught before an experiment starts.

use crate::error::{Result, TraceError};
use crate::schedule::ScheduleParams;
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TraceSummary {
    /// Bandwidth file: one delivery opportunity per line
    DeliverySchedule {
        lines: usize,
        duration_ms: u64,
        packets: u64,
        mean_mbps: f64,
    },
    /// RTT or loss file: `ms,value` per line
    Timeseries {
        lines: usize,
        duration_ms: u64,
        min: f64,
        max: f64,
        mean: f64,
    },
}

/// Verify a prepared file; the kind is taken from the first line
pub fn verify_trace(path: impl AsRef<Path>, params: ScheduleParams) -> Result<TraceSummary> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| TraceError::io(path, e))?;
    verify_lines(BufReader::new(file), path, params)
}

pub fn verify_lines<R: BufRead>(reader: R, source: &Path, params: ScheduleParams) -> Result<TraceSummary> {
    let lines: Vec<String> = reader
        .lines()
        .collect::<std::io::Result<_>>()
        .map_err(|e| TraceError::io(source, e))?;

    let Some(first) = lines.first() else {
        return Err(invalid(source, 0, "no valid trace data found"));
    };

    if first.contains(',') {
        verify_timeseries(&lines, source)
    } else {
        verify_schedule(&lines, source, params)
    }
}

fn invalid(source: &Path, line: usize, reason: impl Into<String>) -> TraceError {
    TraceError::InvalidSchedule {
        path: source.to_path_buf(),
        line,
        reason: reason.into(),
    }
}

fn parse_ms(text: &str, source: &Path, line: usize) -> Result<u64> {
    text.trim()
        .parse::<u64>()
        .map_err(|e| invalid(source, line, format!("bad timestamp {text:?}: {e}")))
}

fn verify_schedule(lines: &[String], source: &Path, params: ScheduleParams) -> Result<TraceSummary> {
    let mut last = 0u64;

    for (index, line) in lines.iter().enumerate() {
        let line_no = index + 1;
        if line.is_empty() {
            return Err(invalid(source, line_no, "invalid empty line"));
        }
        let ms = parse_ms(line, source, line_no)?;
        if ms < last {
            return Err(invalid(
                source,
                line_no,
                format!("timestamp {ms} goes back in time (previous {last})"),
            ));
        }
        last = ms;
    }

    let packets = lines.len() as u64;
    let mean_mbps = if last == 0 {
        0.0
    } else {
        (packets * params.packet_size_bytes as u64 * 8) as f64 / last as f64 / 1000.0
    };

    Ok(TraceSummary::DeliverySchedule {
        lines: lines.len(),
        duration_ms: last,
        packets,
        mean_mbps,
    })
}

fn verify_timeseries(lines: &[String], source: &Path) -> Result<TraceSummary> {
    let mut last = 0u64;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;

    for (index, line) in lines.iter().enumerate() {
        let line_no = index + 1;
        if line.is_empty() {
            return Err(invalid(source, line_no, "invalid empty line"));
        }
        let (ms, value) = line
            .split_once(',')
            .ok_or_else(|| invalid(source, line_no, format!("invalid line: {line}")))?;

        let ms = parse_ms(ms, source, line_no)?;
        if ms < last {
            return Err(invalid(
                source,
                line_no,
                format!("timestamp {ms} goes back in time (previous {last})"),
            ));
        }
        last = ms;

        let value: f64 = value
            .trim()
            .parse()
            .map_err(|e| invalid(source, line_no, format!("bad value {value:?}: {e}")))?;
        min = min.min(value);
        max = max.max(value);
        sum += value;
    }

    Ok(TraceSummary::Timeseries {
        lines: lines.len(),
        duration_ms: last,
        min,
        max,
        mean: sum / lines.len() as f64,
    })
}
