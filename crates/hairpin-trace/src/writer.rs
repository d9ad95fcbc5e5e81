//! Emulator trace file writers
//!
//! Bandwidth files list one delivery timestamp (ms) per line, repeated once
//! per packet. RTT and loss files are `timestamp,value` lines, one per sample.

use crate::error::{Result, TraceError};
use crate::schedule::PeriodSchedule;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Output file locations for one prepared trace (or one split of it)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputPaths {
    pub down_link: PathBuf,
    pub up_link: PathBuf,
    pub rtt: PathBuf,
    pub loss_rate: PathBuf,
}

impl OutputPaths {
    /// Paths for `base_name` in `output_dir`; `split` adds the window number
    pub fn new(output_dir: impl AsRef<Path>, base_name: &str, split: Option<usize>) -> Self {
        let dir = output_dir.as_ref();
        let tagged = match split {
            Some(n) => format!("{n}_{base_name}"),
            None => base_name.to_string(),
        };
        Self {
            down_link: dir.join(format!("bandwidth_trace_down_link_{tagged}")),
            up_link: dir.join(format!("bandwidth_trace_up_link_{tagged}")),
            rtt: dir.join(format!("rtt_trace_{base_name}")),
            loss_rate: dir.join(format!("lossrate_trace_{tagged}")),
        }
    }
}

/// Shortest round-trip decimal for `value`, always with a fractional part
/// or an exponent (`30.0`, `0.01`, `1e-05`, `1.5e+16`)
pub fn format_value(value: f64) -> String {
    let repr = format!("{value:?}");
    match repr.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => repr,
    }
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| TraceError::io(path, e))
}

fn finish(path: &Path, mut writer: BufWriter<File>) -> Result<()> {
    writer.flush().map_err(|e| TraceError::io(path, e))
}

/// Write identical delivery schedules for the down-link and up-link
pub fn write_link_schedules(
    down_link: &Path,
    up_link: &Path,
    schedules: &[PeriodSchedule],
) -> Result<u64> {
    let mut down = create(down_link)?;
    let mut up = create(up_link)?;
    let mut packets = 0u64;

    for schedule in schedules {
        for timestamp in schedule.timestamps() {
            writeln!(down, "{timestamp}").map_err(|e| TraceError::io(down_link, e))?;
            writeln!(up, "{timestamp}").map_err(|e| TraceError::io(up_link, e))?;
            packets += 1;
        }
    }

    finish(down_link, down)?;
    finish(up_link, up)?;
    info!(
        "Wrote {} packet opportunities to {} and {}",
        packets,
        down_link.display(),
        up_link.display()
    );
    Ok(packets)
}

/// Write `timestamp,value` lines; the first sample is stamped `period_ms`
pub fn write_timeseries(path: &Path, values: &[f64], period_ms: u32) -> Result<()> {
    let mut out = create(path)?;
    let mut timestamp = period_ms as u64;

    for value in values {
        writeln!(out, "{},{}", timestamp, format_value(*value)).map_err(|e| TraceError::io(path, e))?;
        timestamp += period_ms as u64;
    }

    finish(path, out)?;
    info!("Wrote {} samples to {}", values.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{build_schedules, ScheduleParams};

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(30.0), "30.0");
        assert_eq!(format_value(0.0), "0.0");
        assert_eq!(format_value(0.01), "0.01");
        assert_eq!(format_value(55.5), "55.5");
        assert_eq!(format_value(0.0001), "0.0001");
        assert_eq!(format_value(0.00001), "1e-05");
        assert_eq!(format_value(1.5e-7), "1.5e-07");
        assert_eq!(format_value(1e16), "1e+16");
        assert_eq!(format_value(1.2345e120), "1.2345e+120");
    }

    #[test]
    fn test_output_paths() {
        let plain = OutputPaths::new("/out", "trace.log", None);
        assert_eq!(plain.down_link, PathBuf::from("/out/bandwidth_trace_down_link_trace.log"));
        assert_eq!(plain.up_link, PathBuf::from("/out/bandwidth_trace_up_link_trace.log"));
        assert_eq!(plain.rtt, PathBuf::from("/out/rtt_trace_trace.log"));
        assert_eq!(plain.loss_rate, PathBuf::from("/out/lossrate_trace_trace.log"));

        let split = OutputPaths::new("/out", "trace.log", Some(3));
        assert_eq!(split.down_link, PathBuf::from("/out/bandwidth_trace_down_link_3_trace.log"));
        assert_eq!(split.loss_rate, PathBuf::from("/out/lossrate_trace_3_trace.log"));
    }

    #[test]
    fn test_write_files() {
        let dir = tempfile::tempdir().unwrap();
        let paths = OutputPaths::new(dir.path(), "t", None);

        let schedules = build_schedules(&[0.4, 0.8], ScheduleParams::default()).unwrap();
        let packets = write_link_schedules(&paths.down_link, &paths.up_link, &schedules).unwrap();
        assert_eq!(packets, 3);

        let down = std::fs::read_to_string(&paths.down_link).unwrap();
        let up = std::fs::read_to_string(&paths.up_link).unwrap();
        assert_eq!(down, "1\n31\n46\n");
        assert_eq!(down, up);

        write_timeseries(&paths.loss_rate, &[0.0, 0.25, 1.0], 30).unwrap();
        let loss = std::fs::read_to_string(&paths.loss_rate).unwrap();
        assert_eq!(loss, "30,0.0\n60,0.25\n90,1.0\n");
    }

    #[test]
    fn test_write_into_missing_directory_fails() {
        let err = write_timeseries(Path::new("/nonexistent/dir/file"), &[1.0], 30).unwrap_err();
        assert!(matches!(err, TraceError::Io { .. }));
    }
}
