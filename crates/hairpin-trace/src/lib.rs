//! Measurement trace preparation for trace-driven link emulation
//!
//! This crate turns raw `bandwidth rtt loss_rate` measurement traces, one
//! sample per 30 ms period, into the files a trace-driven emulator replays:
//! per-millisecond packet delivery schedules for both link directions plus
//! `ms,value` timeseries for RTT and loss.

pub mod config;
pub mod error;
pub mod prepare;
pub mod reader;
pub mod schedule;
pub mod segment;
pub mod select;
pub mod units;
pub mod verify;
pub mod writer;

pub use config::{MalformedLinePolicy, PrepareConfig};
pub use error::{Result, TraceError};
pub use prepare::{prepare_hairpin, prepare_hairpin_split, PrepareReport, TraceFormat};
pub use reader::{read_trace, ReadOptions};
pub use schedule::{build_schedules, spread_packets, PeriodSchedule, ScheduleParams};
pub use segment::{SegmentParams, Segmenter, Window};
pub use select::select_traces;
pub use verify::{verify_trace, TraceSummary};

/// One measurement period
#[derive(Clone, Debug, PartialEq)]
pub struct TraceSample {
    /// Link capacity in Mbps
    pub bandwidth: f64,
    /// Round-trip time; absent when the reader was told to skip it
    pub rtt: Option<f64>,
    /// Loss rate (0.0-1.0)
    pub loss_rate: f64,
}

/// Ordered samples of one trace, one per period
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Trace {
    samples: Vec<TraceSample>,
}

impl Trace {
    pub fn new(samples: Vec<TraceSample>) -> Self {
        Self { samples }
    }

    pub fn push(&mut self, sample: TraceSample) {
        self.samples.push(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[TraceSample] {
        &self.samples
    }

    pub fn bandwidth(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.bandwidth).collect()
    }

    /// RTT column; empty when it was not collected
    pub fn rtt(&self) -> Vec<f64> {
        self.samples.iter().filter_map(|s| s.rtt).collect()
    }

    pub fn loss_rate(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.loss_rate).collect()
    }
}

impl FromIterator<TraceSample> for Trace {
    fn from_iter<I: IntoIterator<Item = TraceSample>>(iter: I) -> Self {
        Self {
            samples: iter.into_iter().collect(),
        }
    }
}
