//! End-to-end preparation of emulator traces
//!
//! `hairpin` converts a whole trace; `hairpin_split` first cuts it into
//! rescaled, loss-capped windows and converts each of them.

use crate::config::PrepareConfig;
use crate::error::{Result, TraceError};
use crate::reader::{read_trace, ReadOptions};
use crate::schedule::{build_schedules, ScheduleParams};
use crate::segment::{SegmentParams, Segmenter};
use crate::writer::{write_link_schedules, write_timeseries, OutputPaths};
use rand::Rng;
use std::path::{Path, PathBuf};
use tracing::info;

/// Input layouts understood by `prepare_trace`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TraceFormat {
    /// One output set for the whole trace
    Hairpin,
    /// One output set per emitted window
    HairpinSplit,
}

impl TraceFormat {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "hairpin" => Some(TraceFormat::Hairpin),
            "hairpin_split" => Some(TraceFormat::HairpinSplit),
            _ => None,
        }
    }
}

/// What a preparation run produced
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PrepareReport {
    /// Samples kept by the reader
    pub samples: usize,
    /// Output sets written (1 for the whole-trace format)
    pub outputs: usize,
    /// Delivery opportunities written per link direction
    pub packets: u64,
    pub files: Vec<PathBuf>,
}

fn base_name(input: &Path) -> Result<String> {
    input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| TraceError::Config(format!("input path {} has no file name", input.display())))
}

/// Convert a whole trace: bandwidth schedules, rtt and loss timeseries
pub fn prepare_hairpin(input: &Path, output_dir: &Path, config: &PrepareConfig) -> Result<PrepareReport> {
    config.validate()?;
    let base = base_name(input)?;
    let trace = read_trace(
        input,
        ReadOptions {
            collect_rtt: true,
            malformed_lines: config.malformed_lines,
        },
    )?;

    let params = ScheduleParams::from(config);
    let paths = OutputPaths::new(output_dir, &base, None);
    let schedules = build_schedules(&trace.bandwidth(), params)?;

    let packets = write_link_schedules(&paths.down_link, &paths.up_link, &schedules)?;
    write_timeseries(&paths.rtt, &trace.rtt(), config.period_ms)?;
    write_timeseries(&paths.loss_rate, &trace.loss_rate(), config.period_ms)?;

    info!("Prepared {} samples from {}", trace.len(), input.display());
    Ok(PrepareReport {
        samples: trace.len(),
        outputs: 1,
        packets,
        files: vec![paths.down_link, paths.up_link, paths.rtt, paths.loss_rate],
    })
}

/// Convert every emitted window of a trace into its own numbered output set
pub fn prepare_hairpin_split<R: Rng>(
    input: &Path,
    output_dir: &Path,
    config: &PrepareConfig,
    rng: R,
) -> Result<PrepareReport> {
    config.validate()?;
    let base = base_name(input)?;
    let trace = read_trace(
        input,
        ReadOptions {
            collect_rtt: false,
            malformed_lines: config.malformed_lines,
        },
    )?;

    let params = ScheduleParams::from(config);
    let mut segmenter = Segmenter::new(SegmentParams::from(config), rng);
    let windows = segmenter.segment(&trace)?;

    let mut report = PrepareReport {
        samples: trace.len(),
        ..Default::default()
    };

    for window in &windows {
        let paths = OutputPaths::new(output_dir, &base, Some(window.split));
        let schedules = build_schedules(&window.bandwidth, params)?;

        report.packets += write_link_schedules(&paths.down_link, &paths.up_link, &schedules)?;
        write_timeseries(&paths.loss_rate, &window.loss_rate, config.period_ms)?;
        report
            .files
            .extend([paths.down_link, paths.up_link, paths.loss_rate]);
    }
    report.outputs = windows.len();

    info!(
        "Prepared {} of {} windows from {}",
        windows.len(),
        trace.len() / config.target_trace_len,
        input.display()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::fs;

    #[test]
    fn test_format_names() {
        assert_eq!(TraceFormat::from_name("hairpin"), Some(TraceFormat::Hairpin));
        assert_eq!(TraceFormat::from_name("hairpin_split"), Some(TraceFormat::HairpinSplit));
        assert_eq!(TraceFormat::from_name("pcap"), None);
    }

    #[test]
    fn test_prepare_hairpin_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("wifi.log");
        fs::write(&input, "12Mbps 40ms 0\n0.4Mbps 41.5ms -1\n0.4Mbps 42ms 0.02\n").unwrap();

        let out = dir.path().join("out");
        fs::create_dir(&out).unwrap();
        let report = prepare_hairpin(&input, &out, &PrepareConfig::default()).unwrap();

        assert_eq!(report.samples, 2);
        assert_eq!(report.outputs, 1);
        assert_eq!(report.packets, 31);
        assert_eq!(report.files.len(), 4);

        let down = fs::read_to_string(out.join("bandwidth_trace_down_link_wifi.log")).unwrap();
        let expected: String = (1..=30).chain(31..=31).map(|ms| format!("{ms}\n")).collect();
        assert_eq!(down, expected);
        assert_eq!(
            fs::read_to_string(out.join("bandwidth_trace_up_link_wifi.log")).unwrap(),
            expected
        );
        assert_eq!(
            fs::read_to_string(out.join("rtt_trace_wifi.log")).unwrap(),
            "30,40.0\n60,42.0\n"
        );
        assert_eq!(
            fs::read_to_string(out.join("lossrate_trace_wifi.log")).unwrap(),
            "30,0.0\n60,0.02\n"
        );
    }

    #[test]
    fn test_prepare_hairpin_fails_on_malformed_line() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("eth.log");
        fs::write(&input, "1 1 0\n1 1\n").unwrap();

        let err = prepare_hairpin(&input, dir.path(), &PrepareConfig::default()).unwrap_err();
        assert!(matches!(err, TraceError::MalformedLine { line: 2, .. }));
    }

    #[test]
    fn test_prepare_split_writes_numbered_sets() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("cell.log");

        // three candidate windows: lossy, clean, lossy; plus a partial tail
        let mut text = String::new();
        for window in 0..3 {
            for i in 0..600 {
                let loss = if window != 1 && i % 20 == 0 { "0.1" } else { "0" };
                text.push_str(&format!("{}Mbps x {}\n", 5 + i % 4, loss));
            }
        }
        for _ in 0..50 {
            text.push_str("5 x 0.3\n");
        }
        fs::write(&input, text).unwrap();

        let report = prepare_hairpin_split(
            &input,
            dir.path(),
            &PrepareConfig::default(),
            StdRng::seed_from_u64(11),
        )
        .unwrap();

        assert_eq!(report.samples, 1850);
        assert_eq!(report.outputs, 2);
        assert_eq!(report.files.len(), 6);

        for split in 0..2 {
            let loss = fs::read_to_string(dir.path().join(format!("lossrate_trace_{split}_cell.log"))).unwrap();
            let lines: Vec<&str> = loss.lines().collect();
            assert_eq!(lines.len(), 600);
            assert_eq!(lines[0].split_once(',').unwrap().0, "30");
            let lossy = lines
                .iter()
                .filter(|l| l.split_once(',').unwrap().1.parse::<f64>().unwrap() > 0.0)
                .count();
            assert_eq!(lossy, 10);

            assert!(dir.path().join(format!("bandwidth_trace_down_link_{split}_cell.log")).exists());
            assert!(dir.path().join(format!("bandwidth_trace_up_link_{split}_cell.log")).exists());
        }
        assert!(!dir.path().join("lossrate_trace_2_cell.log").exists());
        assert!(!dir.path().join("rtt_trace_cell.log").exists());
    }

    #[test]
    fn test_split_is_reproducible_with_seed() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("eth.log");
        let text: String = (0..600).map(|i| format!("{} 1 {}\n", 1 + i % 3, if i % 2 == 0 { "0.2" } else { "0" })).collect();
        fs::write(&input, text).unwrap();

        let a = dir.path().join("a");
        let b = dir.path().join("b");
        fs::create_dir(&a).unwrap();
        fs::create_dir(&b).unwrap();

        let config = PrepareConfig::default();
        prepare_hairpin_split(&input, &a, &config, StdRng::seed_from_u64(5)).unwrap();
        prepare_hairpin_split(&input, &b, &config, StdRng::seed_from_u64(5)).unwrap();

        let name = "lossrate_trace_0_eth.log";
        assert_eq!(
            fs::read_to_string(a.join(name)).unwrap(),
            fs::read_to_string(b.join(name)).unwrap()
        );
    }
}
